use std::sync::mpsc;

/// "Go to the uploaded-items list". Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationRequest;

pub trait Navigator: Send + Sync {
    fn navigate(&self);
}

pub struct ChannelNavigator {
    tx: mpsc::Sender<NavigationRequest>,
}

impl ChannelNavigator {
    pub fn new(tx: mpsc::Sender<NavigationRequest>) -> Self {
        Self { tx }
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self) {
        let _ = self.tx.send(NavigationRequest);
    }
}
