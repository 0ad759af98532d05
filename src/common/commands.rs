/// Commands the UI sends down to the network task.
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Submit a message over HTTP and, if the live connection is open,
    /// broadcast it over the WebSocket as well.
    SendMessage(String),
}
