/// The two states of a node's singleton coordinator.
#[derive(Debug, Clone, Copy, Default)]
#[derive(PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum NodeState {
    /// The local service instance is not running.
    #[default]
    Inactive,
    /// This node hosts the active singleton instance.
    Active,
}
