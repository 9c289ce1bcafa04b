//! Зеркалирование записей в брокер сообщений. Fire-and-forget: очередь
//! переполнена — запись в брокер теряется, файл от этого не страдает.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::Config;
#[cfg(feature = "kafka")]
use crate::diag::Diagnostics;
use crate::error::Result;

pub type PublishError = Box<dyn std::error::Error + Send + Sync>;

/// Клиент брокера. Вызывается только из потока форвардера.
pub trait Publisher: Send + 'static {
    fn publish(&mut self, topic: &str, batch: &[Vec<u8>]) -> std::result::Result<(), PublishError>;
}

/// Когда отправлять накопленную пачку.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    pub max_messages: usize,
    pub max_bytes: usize,
    pub max_delay: Duration,
    pub queue_capacity: usize,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        BatchPolicy {
            max_messages: 200,
            max_bytes: 100_000,
            max_delay: Duration::from_secs(1),
            queue_capacity: 4096,
        }
    }
}

pub(crate) struct Forwarder {
    tx: Option<Sender<Vec<u8>>>,
    handle: Option<JoinHandle<()>>,
}

impl Forwarder {
    pub fn spawn(
        publisher: Box<dyn Publisher>,
        topic: String,
        policy: BatchPolicy,
    ) -> io::Result<Self> {
        let (tx, rx) = bounded(policy.queue_capacity.max(1));
        let handle = thread::Builder::new()
            .name("rotlog-forwarder".into())
            .spawn(move || run_batches(publisher, &topic, policy, rx))?;
        Ok(Forwarder {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Никогда не блокирует. `false` — запись отброшена.
    pub fn forward(&self, bytes: &[u8]) -> bool {
        let Some(ref tx) = self.tx else {
            return false;
        };
        tx.try_send(bytes.to_vec()).is_ok()
    }
}

impl Drop for Forwarder {
    fn drop(&mut self) {
        // Закрытый канал — сигнал потоку отправить остаток и выйти
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_batches(
    mut publisher: Box<dyn Publisher>,
    topic: &str,
    policy: BatchPolicy,
    rx: Receiver<Vec<u8>>,
) {
    let mut batch: Vec<Vec<u8>> = Vec::with_capacity(policy.max_messages);
    let mut bytes = 0usize;
    let mut deadline: Option<Instant> = None;

    let mut send = |batch: &mut Vec<Vec<u8>>, bytes: &mut usize, deadline: &mut Option<Instant>| {
        if !batch.is_empty() {
            // Ошибки брокера намеренно игнорируются
            let _ = publisher.publish(topic, batch);
            batch.clear();
        }
        *bytes = 0;
        *deadline = None;
    };

    loop {
        let next = match deadline {
            Some(at) => rx.recv_deadline(at),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match next {
            Ok(msg) => {
                if batch.is_empty() {
                    deadline = Some(Instant::now() + policy.max_delay);
                }
                bytes += msg.len();
                batch.push(msg);
                if batch.len() >= policy.max_messages || bytes >= policy.max_bytes {
                    send(&mut batch, &mut bytes, &mut deadline);
                }
            }
            Err(RecvTimeoutError::Timeout) => send(&mut batch, &mut bytes, &mut deadline),
            Err(RecvTimeoutError::Disconnected) => {
                send(&mut batch, &mut bytes, &mut deadline);
                break;
            }
        }
    }
}

// ===== Kafka =====

#[cfg(feature = "kafka")]
pub struct KafkaPublisher {
    producer: kafka::producer::Producer,
}

#[cfg(feature = "kafka")]
impl KafkaPublisher {
    /// Сжатие snappy, подтверждения от брокера не ждём.
    pub fn connect(hosts: &[String]) -> std::result::Result<Self, kafka::Error> {
        use kafka::client::{Compression, RequiredAcks};

        let producer = kafka::producer::Producer::from_hosts(hosts.to_vec())
            .with_compression(Compression::SNAPPY)
            .with_required_acks(RequiredAcks::None)
            .with_ack_timeout(Duration::from_secs(1))
            .create()?;
        Ok(KafkaPublisher { producer })
    }
}

#[cfg(feature = "kafka")]
impl Publisher for KafkaPublisher {
    fn publish(&mut self, topic: &str, batch: &[Vec<u8>]) -> std::result::Result<(), PublishError> {
        let records: Vec<_> = batch
            .iter()
            .map(|msg| kafka::producer::Record::from_value(topic, msg.as_slice()))
            .collect();
        self.producer
            .send_all(&records)
            .map(|_| ())
            .map_err(|e| e.to_string().into())
    }
}

/// Форвардер по настройкам `kafka`/`topic`. Недоступный брокер отключает зеркало.
#[cfg(feature = "kafka")]
pub(crate) fn broker_forwarder(
    config: &Config,
    diag: &mut Diagnostics,
) -> Result<Option<Forwarder>> {
    match KafkaPublisher::connect(&config.kafka) {
        Ok(publisher) => Ok(Some(Forwarder::spawn(
            Box::new(publisher),
            config.topic.clone(),
            BatchPolicy::default(),
        )?)),
        Err(e) => {
            diag.report(
                crate::level::Level::Error,
                &format!("kafka producer unavailable, mirroring disabled: {}", e),
            );
            Ok(None)
        }
    }
}

#[cfg(not(feature = "kafka"))]
pub(crate) fn broker_forwarder(
    _config: &Config,
    _diag: &mut crate::diag::Diagnostics,
) -> Result<Option<Forwarder>> {
    Err(crate::error::Error::BrokerUnsupported)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Запоминает всё, что ему отправили.
    #[derive(Clone, Default)]
    pub(crate) struct Recorder {
        pub batches: Arc<Mutex<Vec<(String, Vec<Vec<u8>>)>>>,
    }

    impl Recorder {
        pub fn messages(&self) -> Vec<Vec<u8>> {
            self.batches
                .lock()
                .iter()
                .flat_map(|(_, batch)| batch.iter().cloned())
                .collect()
        }
    }

    impl Publisher for Recorder {
        fn publish(&mut self, topic: &str, batch: &[Vec<u8>]) -> std::result::Result<(), PublishError> {
            self.batches.lock().push((topic.to_owned(), batch.to_vec()));
            Ok(())
        }
    }

    struct Failing;

    impl Publisher for Failing {
        fn publish(&mut self, _: &str, _: &[Vec<u8>]) -> std::result::Result<(), PublishError> {
            Err("broker down".into())
        }
    }

    #[test]
    fn flushes_by_message_count() {
        let recorder = Recorder::default();
        let policy = BatchPolicy {
            max_messages: 3,
            max_delay: Duration::from_secs(3600),
            ..BatchPolicy::default()
        };
        let fwd = Forwarder::spawn(Box::new(recorder.clone()), "logs".into(), policy).unwrap();
        for i in 0..7u8 {
            assert!(fwd.forward(&[i]));
        }
        drop(fwd);

        let batches = recorder.batches.lock();
        let sizes: Vec<usize> = batches.iter().map(|(_, b)| b.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert!(batches.iter().all(|(topic, _)| topic == "logs"));
    }

    #[test]
    fn flushes_by_size_and_by_time() {
        let recorder = Recorder::default();
        let policy = BatchPolicy {
            max_messages: 1000,
            max_bytes: 10,
            max_delay: Duration::from_millis(20),
            ..BatchPolicy::default()
        };
        let fwd = Forwarder::spawn(Box::new(recorder.clone()), "t".into(), policy).unwrap();

        fwd.forward(&[0u8; 12]);
        fwd.forward(b"tail");
        thread::sleep(Duration::from_millis(200));
        assert_eq!(recorder.batches.lock().len(), 2);

        drop(fwd);
        assert_eq!(recorder.messages(), vec![vec![0u8; 12], b"tail".to_vec()]);
    }

    #[test]
    fn publisher_errors_are_ignored() {
        let fwd = Forwarder::spawn(Box::new(Failing), "t".into(), BatchPolicy::default()).unwrap();
        assert!(fwd.forward(b"a"));
        drop(fwd);
    }

    #[cfg(not(feature = "kafka"))]
    #[test]
    fn broker_without_feature_is_rejected() {
        let config = Config::default().broker(["localhost:9092"], "logs");
        let mut diag = crate::diag::Diagnostics::disabled();
        assert!(matches!(
            broker_forwarder(&config, &mut diag),
            Err(crate::error::Error::BrokerUnsupported)
        ));
    }
}
