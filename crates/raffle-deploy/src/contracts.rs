use alloy_sol_types::sol;

pub const VRF_COORDINATOR_MOCK: &str = "VRFCoordinatorV2Mock";
pub const RAFFLE: &str = "Raffle";

sol!(
    #[allow(missing_docs)]
    interface VRFCoordinatorV2Mock {
        event SubscriptionCreated(uint64 indexed subId, address owner);
        event SubscriptionFunded(uint64 indexed subId, uint256 oldBalance, uint256 newBalance);
        event ConsumerAdded(uint64 indexed subId, address consumer);

        function createSubscription() external returns (uint64 subId);
        function fundSubscription(uint64 subId, uint96 amount) external;
        function addConsumer(uint64 subId, address consumer) external;
    }
);
