/// Control over the host application's own lifetime.
///
/// The supervisor uses this to terminate the host when a node started with
/// an explicit argument vector dies fatally.
pub trait HostControl: Send + Sync {
    /// Terminate the host with `code`.
    fn exit(&self, code: i32);
}
