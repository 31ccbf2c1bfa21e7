use crossbeam::channel::{bounded, Receiver, Sender};

/// Read end of a stream between two stages. Iterating it yields items in
/// production order and stops once the producer dropped its `Sender`.
pub type Sequence<T> = Receiver<T>;

/// Unbuffered handoff: a send completes only when a receiver takes the item.
pub fn handoff<T>() -> (Sender<T>, Sequence<T>) {
    bounded(0)
}
