use compact_str::CompactString;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeViewEvent {
    /// `None` means nothing is focused any more.
    FocusChanged(Option<CompactString>),
    SelectionChanged(Vec<CompactString>),
    ExpansionChanged {
        tree_item_id: CompactString,
        expanded: bool,
    },
    Revealed {
        tree_item_id: CompactString,
        index: usize,
    },
    /// Decorations or rows changed; the view should repaint.
    DidChange,
}

#[derive(Clone)]
pub struct TreeViewEventSender {
    tx: Sender<TreeViewEvent>,
}

pub struct TreeViewEventReceiver {
    rx: Receiver<TreeViewEvent>,
}

pub fn tree_view_events() -> (TreeViewEventSender, TreeViewEventReceiver) {
    let (tx, rx) = mpsc::channel();
    (TreeViewEventSender { tx }, TreeViewEventReceiver { rx })
}

impl TreeViewEventSender {
    /// A dropped receiver only means nobody is listening.
    pub fn send(&self, event: TreeViewEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("tree view event receiver dropped");
        }
    }
}

impl TreeViewEventReceiver {
    pub fn try_recv(&mut self) -> Result<TreeViewEvent, TryRecvError> {
        self.rx.try_recv()
    }

    /// Everything queued so far.
    pub fn drain(&mut self) -> Vec<TreeViewEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            out.push(event);
        }
        out
    }
}
