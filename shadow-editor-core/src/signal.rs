//! Notifications emitted after the state changes, for views to refresh themselves.

use crate::history::CommandId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Attributes or transform of an object changed.
    ObjectChanged(uuid::Uuid),
    ObjectAdded(uuid::Uuid),
    ObjectRemoved(uuid::Uuid),
    /// The shape of the tree changed, or many things changed at once.
    SceneGraphChanged,
    /// The material of the object changed or was replaced.
    MaterialChanged(uuid::Uuid),
    GeometryChanged(uuid::Uuid),
    ScriptAdded {
        object: uuid::Uuid,
        script: uuid::Uuid,
    },
    ScriptRemoved {
        object: uuid::Uuid,
        script: uuid::Uuid,
    },
    ScriptChanged {
        object: uuid::Uuid,
        script: uuid::Uuid,
    },
    /// The history stacks changed. Carries the id now on top of the undo stack.
    HistoryChanged(Option<CommandId>),
    /// An operation failed and the state was left as it was.
    Failed(String),
}

/// Receiver of [`Signal`]s.
pub trait Notifier {
    fn notify(&mut self, signal: Signal);
}

/// Collects every signal, oldest first.
impl Notifier for Vec<Signal> {
    fn notify(&mut self, signal: Signal) {
        self.push(signal);
    }
}

/// Discards every signal.
impl Notifier for () {
    fn notify(&mut self, _: Signal) {}
}

impl<F> Notifier for F
where
    F: FnMut(Signal),
{
    fn notify(&mut self, signal: Signal) {
        self(signal);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn closures_notify() {
        let mut count = 0;
        let mut notifier = |_: Signal| count += 1;
        notifier.notify(Signal::SceneGraphChanged);
        notifier.notify(Signal::SceneGraphChanged);
        assert_eq!(count, 2);
    }
}
