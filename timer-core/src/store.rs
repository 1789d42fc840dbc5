//! A value container that tells its subscribers whenever it is republished.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionId(u64);

pub type Subscriber<T> = Box<dyn FnMut(&T)>;

pub struct Store<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_id: u64,
}

impl<T: Clone> Store<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// An owned copy that shares nothing with the stored value.
    pub fn snapshot(&self) -> T {
        self.value.clone()
    }

    /// Register a subscriber. It is called right away with the current value,
    /// then on every publish.
    pub fn subscribe<F>(&mut self, mut f: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        f(&self.value);
        self.subscribers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Replace the value and publish it.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.publish();
    }

    /// Mutate in place, then publish.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut T),
    {
        f(&mut self.value);
        self.publish();
    }

    fn publish(&mut self) {
        let value = &self.value;
        for (_, sub) in self.subscribers.iter_mut() {
            sub(value);
        }
    }
}
