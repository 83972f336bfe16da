//! In-process latched bus
//!
//! Topics are created on first use, by a publisher or a subscriber. A
//! publisher declares the topic's QoS; with `TransientLocal` durability the
//! topic keeps its last N messages and replays them to every new subscriber.
//! When the last publisher of a topic is dropped its history goes with it.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use gamevis_core::{VisError, VisResult};
use gamevis_msgs::{CloudMessage, Marker};

use crate::{Channel, ChannelFactory, QosProfile};

struct Topic<M> {
    qos: QosProfile,
    history: VecDeque<M>,
    subscribers: Vec<mpsc::UnboundedSender<M>>,
    publishers: usize,
    published: u64,
}

impl<M: Clone> Topic<M> {
    fn new() -> Self {
        Topic {
            qos: QosProfile::default(),
            history: VecDeque::new(),
            subscribers: Vec::new(),
            publishers: 0,
            published: 0,
        }
    }

    fn publish(&mut self, msg: &M) {
        self.published += 1;

        // Dropped subscribers are pruned here
        self.subscribers.retain(|tx| tx.send(msg.clone()).is_ok());

        match self.qos.retained() {
            Some(0) => {}
            Some(depth) => {
                if self.history.len() == depth {
                    self.history.pop_front();
                }
                self.history.push_back(msg.clone());
            }
            None => self.history.push_back(msg.clone()),
        }
    }

    /// Forget what the last publisher left behind. Returns true when nobody
    /// is listening either, so the topic can be removed.
    fn release(&mut self) -> bool {
        self.history.clear();
        self.subscribers.retain(|tx| !tx.is_closed());
        self.subscribers.is_empty()
    }

    fn declare(&mut self, qos: QosProfile) {
        self.qos = qos;
        if let Some(depth) = qos.retained() {
            while self.history.len() > depth {
                self.history.pop_front();
            }
        }
    }
}

/// Topic table for one message type
struct TopicTable<M> {
    topics: HashMap<String, Topic<M>>,
}

impl<M: Clone> TopicTable<M> {
    fn new() -> Self {
        TopicTable {
            topics: HashMap::new(),
        }
    }

    fn topic(&mut self, name: &str) -> &mut Topic<M> {
        self.topics
            .entry(name.to_string())
            .or_insert_with(Topic::new)
    }

    fn subscribe(&mut self, name: &str) -> Subscription<M> {
        let (tx, rx) = mpsc::unbounded_channel();
        let topic = self.topic(name);
        for msg in &topic.history {
            // Receiver is alive: it is returned below
            let _ = tx.send(msg.clone());
        }
        topic.subscribers.push(tx);
        Subscription {
            topic: name.to_string(),
            rx,
        }
    }
}

type SharedTable<M> = Arc<Mutex<TopicTable<M>>>;

/// In-process bus carrying point cloud frames and markers
#[derive(Clone)]
pub struct LocalBus {
    points: SharedTable<CloudMessage>,
    markers: SharedTable<Marker>,
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBus {
    pub fn new() -> Self {
        LocalBus {
            points: Arc::new(Mutex::new(TopicTable::new())),
            markers: Arc::new(Mutex::new(TopicTable::new())),
        }
    }

    pub fn subscribe_points(&self, topic: &str) -> Subscription<CloudMessage> {
        self.points.lock().subscribe(topic)
    }

    pub fn subscribe_markers(&self, topic: &str) -> Subscription<Marker> {
        self.markers.lock().subscribe(topic)
    }

    /// Messages ever published on a topic (points and markers)
    pub fn published_count(&self, topic: &str) -> u64 {
        let points = self.points.lock().topics.get(topic).map_or(0, |t| t.published);
        let markers = self.markers.lock().topics.get(topic).map_or(0, |t| t.published);
        points + markers
    }

    /// Live channel handles bound to a topic
    pub fn publisher_count(&self, topic: &str) -> usize {
        let points = self.points.lock().topics.get(topic).map_or(0, |t| t.publishers);
        let markers = self.markers.lock().topics.get(topic).map_or(0, |t| t.publishers);
        points + markers
    }

    /// Retained messages a late joiner would receive
    pub fn retained_count(&self, topic: &str) -> usize {
        let points = self.points.lock().topics.get(topic).map_or(0, |t| t.history.len());
        let markers = self.markers.lock().topics.get(topic).map_or(0, |t| t.history.len());
        points + markers
    }

    /// All known topic names, sorted
    pub fn topics(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .points
            .lock()
            .topics
            .keys()
            .chain(self.markers.lock().topics.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn bind<M: Clone>(table: &SharedTable<M>, topic: &str, qos: QosProfile) -> VisResult<LocalChannel<M>> {
        validate_topic(topic)?;
        {
            let mut guard = table.lock();
            let t = guard.topic(topic);
            if t.publishers == 0 {
                // A new owner starts from an empty history
                t.history.clear();
            }
            t.declare(qos);
            t.publishers += 1;
        }
        tracing::debug!(topic, ?qos, "bound channel");
        Ok(LocalChannel {
            topic: topic.to_string(),
            table: Arc::clone(table),
        })
    }
}

fn validate_topic(topic: &str) -> VisResult<()> {
    if topic.is_empty() || topic.chars().any(char::is_whitespace) {
        return Err(VisError::Transport(format!("invalid topic name '{}'", topic)));
    }
    Ok(())
}

impl ChannelFactory for LocalBus {
    fn points_channel(&self, topic: &str, qos: QosProfile) -> VisResult<Box<dyn Channel<CloudMessage>>> {
        Ok(Box::new(Self::bind(&self.points, topic, qos)?))
    }

    fn marker_channel(&self, topic: &str, qos: QosProfile) -> VisResult<Box<dyn Channel<Marker>>> {
        Ok(Box::new(Self::bind(&self.markers, topic, qos)?))
    }
}

/// Publisher handle for one topic. Dropping it releases the binding.
pub struct LocalChannel<M: Clone> {
    topic: String,
    table: SharedTable<M>,
}

impl<M: Clone + Send> Channel<M> for LocalChannel<M> {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn publish(&self, msg: &M) -> VisResult<()> {
        self.table.lock().topic(&self.topic).publish(msg);
        Ok(())
    }
}

impl<M: Clone> Drop for LocalChannel<M> {
    fn drop(&mut self) {
        let mut guard = self.table.lock();
        let unused = match guard.topics.get_mut(&self.topic) {
            Some(t) => {
                t.publishers = t.publishers.saturating_sub(1);
                t.publishers == 0 && t.release()
            }
            None => false,
        };
        if unused {
            guard.topics.remove(&self.topic);
        }
    }
}

/// Receiving end of a topic
pub struct Subscription<M> {
    topic: String,
    rx: mpsc::UnboundedReceiver<M>,
}

impl<M> Subscription<M> {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Next queued message, if any
    pub fn try_recv(&mut self) -> Option<M> {
        self.rx.try_recv().ok()
    }

    /// Everything queued so far
    pub fn drain(&mut self) -> Vec<M> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(msg);
        }
        out
    }

    /// Most recent queued message, discarding older ones
    pub fn latest(&mut self) -> Option<M> {
        self.drain().pop()
    }

    /// Wait for the next message. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<M> {
        self.rx.recv().await
    }
}
