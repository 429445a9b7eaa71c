//! Thin façade over serial, intra-process or inter-process (MPI) message passing.
//!
//! The ghost exchange needs exactly one primitive: a blocking paired
//! send/receive addressed by partition ordinal. A `None` peer turns that half
//! into a no-op, the analogue of sending to `MPI_PROC_NULL`. Messages are
//! contiguous byte slices; [`crate::algs::wire`] casts field planes to bytes.

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use crate::sor_error::SorError;

/// Message tag distinguishing the two exchanges of a sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommTag(pub u16);

impl CommTag {
    /// Plane travelling toward higher ordinals.
    pub const HALO_UP: CommTag = CommTag(1023);
    /// Plane travelling toward lower ordinals.
    pub const HALO_DOWN: CommTag = CommTag(1024);

    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

/// Blocking point-to-point transport between partitions.
pub trait Communicator {
    /// Ordinal of this endpoint.
    fn rank(&self) -> usize;

    /// Number of endpoints in the process group.
    fn size(&self) -> usize;

    /// Send `send` to `dest` and receive exactly `recv.len()` bytes from
    /// `source`, both under `tag`, returning once both halves are done.
    ///
    /// # Errors
    /// `CommError` on transport failure or a message of the wrong length,
    /// `CommTimeout` if the backend gives up waiting.
    fn sendrecv(
        &self,
        dest: Option<usize>,
        send: &[u8],
        source: Option<usize>,
        recv: &mut [u8],
        tag: CommTag,
    ) -> Result<(), SorError>;

    /// Tear down the whole process group after a fatal error on this rank.
    ///
    /// Peers blocked in [`Communicator::sendrecv`] must not wait forever.
    fn abort(&self, code: i32);
}

impl<C: Communicator + ?Sized> Communicator for &C {
    fn rank(&self) -> usize {
        (**self).rank()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn sendrecv(
        &self,
        dest: Option<usize>,
        send: &[u8],
        source: Option<usize>,
        recv: &mut [u8],
        tag: CommTag,
    ) -> Result<(), SorError> {
        (**self).sendrecv(dest, send, source, recv, tag)
    }

    fn abort(&self, code: i32) {
        (**self).abort(code)
    }
}

/// Serial communicator for single-partition runs and unit tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn sendrecv(
        &self,
        dest: Option<usize>,
        _send: &[u8],
        source: Option<usize>,
        _recv: &mut [u8],
        _tag: CommTag,
    ) -> Result<(), SorError> {
        match dest.or(source) {
            Some(peer) => Err(SorError::comm(peer, "NoComm has no peers")),
            None => Ok(()),
        }
    }

    fn abort(&self, code: i32) {
        log::error!("serial run aborted with code {code}");
    }
}

// --- LocalComm: intra-process, one endpoint per thread ---
type Key = (usize, usize, u16); // (src, dst, tag)

#[derive(Debug, Default)]
struct Slot {
    queue: Mutex<VecDeque<Bytes>>,
    ready: Condvar,
}

#[derive(Debug, Default)]
struct Mailbox {
    slots: DashMap<Key, Arc<Slot>>,
    aborted_by: OnceLock<usize>,
}

impl Mailbox {
    fn slot(&self, key: Key) -> Arc<Slot> {
        self.slots.entry(key).or_default().clone()
    }

    fn abort(&self, rank: usize) {
        if self.aborted_by.set(rank).is_err() {
            return;
        }
        let slots: Vec<_> = self.slots.iter().map(|e| Arc::clone(e.value())).collect();
        for slot in slots {
            // Taking the lock orders the wake-up after any check made under it.
            let _queue = slot.queue.lock();
            slot.ready.notify_all();
        }
    }
}

/// In-process communicator: every endpoint of a world shares one mailbox and
/// messages queue FIFO per `(src, dst, tag)`.
#[derive(Clone, Debug)]
pub struct LocalComm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
    timeout: Option<Duration>,
}

impl LocalComm {
    /// Create the `size` endpoints of a fresh world, in rank order.
    pub fn world(size: usize) -> Vec<LocalComm> {
        let mailbox = Arc::new(Mailbox::default());
        (0..size)
            .map(|rank| LocalComm {
                rank,
                size,
                mailbox: Arc::clone(&mailbox),
                timeout: None,
            })
            .collect()
    }

    /// Fail a receive with `CommTimeout` after waiting `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn check_peer(&self, peer: usize) -> Result<(), SorError> {
        if peer >= self.size {
            return Err(SorError::comm(
                peer,
                format!("rank out of range for world of {}", self.size),
            ));
        }
        Ok(())
    }

    fn post(&self, dest: usize, tag: CommTag, buf: &[u8]) {
        let slot = self.mailbox.slot((self.rank, dest, tag.as_u16()));
        slot.queue.lock().push_back(Bytes::copy_from_slice(buf));
        slot.ready.notify_one();
    }

    fn take(&self, source: usize, tag: CommTag) -> Result<Bytes, SorError> {
        let slot = self.mailbox.slot((source, self.rank, tag.as_u16()));
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut queue = slot.queue.lock();
        loop {
            if let Some(&rank) = self.mailbox.aborted_by.get() {
                return Err(SorError::Aborted { rank });
            }
            if let Some(msg) = queue.pop_front() {
                return Ok(msg);
            }
            match deadline {
                None => slot.ready.wait(&mut queue),
                Some(deadline) => {
                    if slot.ready.wait_until(&mut queue, deadline).timed_out() {
                        if let Some(msg) = queue.pop_front() {
                            return Ok(msg);
                        }
                        log::warn!(
                            "[rank {}] receive from rank {source} (tag {}) timed out",
                            self.rank,
                            tag.as_u16()
                        );
                        return Err(SorError::CommTimeout {
                            neighbor: source,
                            tag: tag.as_u16(),
                        });
                    }
                }
            }
        }
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn sendrecv(
        &self,
        dest: Option<usize>,
        send: &[u8],
        source: Option<usize>,
        recv: &mut [u8],
        tag: CommTag,
    ) -> Result<(), SorError> {
        // Posting never blocks, so sending first cannot deadlock the pair.
        if let Some(dest) = dest {
            self.check_peer(dest)?;
            self.post(dest, tag, send);
        }
        if let Some(source) = source {
            self.check_peer(source)?;
            let msg = self.take(source, tag)?;
            if msg.len() != recv.len() {
                return Err(SorError::comm(
                    source,
                    format!("expected {} bytes, got {}", recv.len(), msg.len()),
                ));
            }
            recv.copy_from_slice(&msg);
        }
        Ok(())
    }

    fn abort(&self, code: i32) {
        log::error!("[rank {}] aborting world with code {code}", self.rank);
        self.mailbox.abort(self.rank);
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{CommTag, Communicator, SorError};
    use mpi::environment::Universe;
    use mpi::point_to_point as p2p;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as MpiCommunicator, Destination, Equivalence, Source};

    /// One rank of `MPI_COMM_WORLD`. MPI is finalized when this is dropped.
    pub struct MpiComm {
        pub world: SimpleCommunicator,
        rank: usize,
        size: usize,
        _universe: Universe,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, SorError> {
            let universe = mpi::initialize()
                .ok_or_else(|| SorError::Config("MPI was already initialized".into()))?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                world,
                rank,
                size,
                _universe: universe,
            })
        }

        /// `MPI_Abort` on the world; never returns.
        pub fn abort(&self, code: i32) -> ! {
            self.world.abort(code)
        }
    }

    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn sendrecv(
            &self,
            dest: Option<usize>,
            send: &[u8],
            source: Option<usize>,
            recv: &mut [u8],
            tag: CommTag,
        ) -> Result<(), SorError> {
            let tag = i32::from(tag.as_u16());
            let status = match (dest, source) {
                (Some(d), Some(s)) => {
                    let to = self.world.process_at_rank(d as i32);
                    let from = self.world.process_at_rank(s as i32);
                    Some(p2p::send_receive_into_with_tags(
                        send, &to, tag, recv, &from, tag,
                    ))
                }
                (Some(d), None) => {
                    self.world.process_at_rank(d as i32).send_with_tag(send, tag);
                    None
                }
                (None, Some(s)) => Some(
                    self.world
                        .process_at_rank(s as i32)
                        .receive_into_with_tag(recv, tag),
                ),
                (None, None) => None,
            };
            if let (Some(status), Some(s)) = (status, source) {
                let got = status.count(u8::equivalent_datatype()) as usize;
                if got != recv.len() {
                    return Err(SorError::comm(
                        s,
                        format!("expected {} bytes, got {got}", recv.len()),
                    ));
                }
            }
            Ok(())
        }

        fn abort(&self, code: i32) {
            MpiComm::abort(self, code)
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn no_comm_only_accepts_missing_peers() {
        let comm = NoComm;
        assert_eq!((comm.rank(), comm.size()), (0, 1));
        let mut buf = [0u8; 4];
        comm.sendrecv(None, &[1, 2], None, &mut buf, CommTag::HALO_UP)
            .unwrap();
        assert!(matches!(
            comm.sendrecv(Some(1), &[1], None, &mut buf, CommTag::HALO_UP),
            Err(SorError::CommError { neighbor: 1, .. })
        ));
    }

    #[test]
    fn local_pair_swaps_payloads() {
        let mut world = LocalComm::world(2).into_iter();
        let (c0, c1) = (world.next().unwrap(), world.next().unwrap());
        let t = thread::spawn(move || {
            let mut got = [0u8; 3];
            c1.sendrecv(Some(0), b"one", Some(0), &mut got, CommTag(7))
                .unwrap();
            got
        });
        let mut got = [0u8; 3];
        c0.sendrecv(Some(1), b"zer", Some(1), &mut got, CommTag(7))
            .unwrap();
        assert_eq!(&got, b"one");
        assert_eq!(&t.join().unwrap(), b"zer");
    }

    #[test]
    fn tags_do_not_cross() {
        let world = LocalComm::world(2);
        world[0]
            .sendrecv(Some(1), b"b", None, &mut [], CommTag::HALO_DOWN)
            .unwrap();
        world[0]
            .sendrecv(Some(1), b"a", None, &mut [], CommTag::HALO_UP)
            .unwrap();
        let mut up = [0u8; 1];
        let mut down = [0u8; 1];
        world[1]
            .sendrecv(None, &[], Some(0), &mut up, CommTag::HALO_UP)
            .unwrap();
        world[1]
            .sendrecv(None, &[], Some(0), &mut down, CommTag::HALO_DOWN)
            .unwrap();
        assert_eq!((&up, &down), (b"a", b"b"));
    }

    #[test]
    fn length_mismatch_and_timeout_are_errors() {
        let world: Vec<_> = LocalComm::world(2)
            .into_iter()
            .map(|c| c.with_timeout(Duration::from_millis(20)))
            .collect();
        world[0]
            .sendrecv(Some(1), &[1, 2, 3], None, &mut [], CommTag(1))
            .unwrap();
        let mut short = [0u8; 2];
        assert!(matches!(
            world[1].sendrecv(None, &[], Some(0), &mut short, CommTag(1)),
            Err(SorError::CommError { neighbor: 0, .. })
        ));
        assert!(matches!(
            world[1].sendrecv(None, &[], Some(0), &mut short, CommTag(1)),
            Err(SorError::CommTimeout { neighbor: 0, tag: 1 })
        ));
        assert!(world[1]
            .sendrecv(Some(5), &[], None, &mut [], CommTag(1))
            .is_err());
    }

    #[test]
    fn abort_wakes_a_blocked_receiver() {
        let world = LocalComm::world(3);
        let waiter = world[1].clone();
        let t = thread::spawn(move || {
            let mut buf = [0u8; 1];
            waiter.sendrecv(None, &[], Some(2), &mut buf, CommTag::HALO_DOWN)
        });
        thread::sleep(Duration::from_millis(20));
        world[0].abort(1);
        assert!(matches!(t.join().unwrap(), Err(SorError::Aborted { rank: 0 })));
        // later receives fail at once, even with a message queued
        world[2]
            .sendrecv(Some(1), b"x", None, &mut [], CommTag::HALO_UP)
            .unwrap();
        let mut buf = [0u8; 1];
        assert!(matches!(
            world[1].sendrecv(None, &[], Some(2), &mut buf, CommTag::HALO_UP),
            Err(SorError::Aborted { rank: 0 })
        ));
    }
}
