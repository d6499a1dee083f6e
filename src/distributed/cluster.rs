//! In-process cluster: one thread per rank, one FIFO channel per ordered pair
//! of ranks. Ranks share nothing but the channels.

use super::comm::{Communicator, GatherLayout, Word, ROOT};
use crate::error::{Error, Result};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

enum Packet {
    Data(Vec<Word>),
    Abort(String),
}

/// One rank's endpoint.
pub struct ChannelCommunicator {
    rank: usize,
    outbox: Vec<Sender<Packet>>,
    inbox: Vec<Receiver<Packet>>,
}

impl ChannelCommunicator {
    fn send(&self, to: usize, data: Vec<Word>) -> Result<()> {
        self.outbox[to]
            .send(Packet::Data(data))
            .map_err(|_| Error::Disconnected { rank: to })
    }

    fn receive(&self, from: usize) -> Result<Vec<Word>> {
        match self.inbox[from].recv() {
            Ok(Packet::Data(data)) => Ok(data),
            Ok(Packet::Abort(reason)) => Err(Error::Aborted { rank: from, reason }),
            Err(_) => Err(Error::Disconnected { rank: from }),
        }
    }

    fn receive_exact(&self, from: usize, len: usize) -> Result<Vec<Word>> {
        let data = self.receive(from)?;
        if data.len() != len {
            return Err(Error::invalid_data(format!(
                "rank {from} sent {} words, expected {len}",
                data.len()
            )));
        }
        Ok(data)
    }
}

impl Communicator for ChannelCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.outbox.len()
    }

    fn broadcast(&self, buffer: &mut Vec<Word>) -> Result<()> {
        if self.is_root() {
            for rank in 1..self.size() {
                self.send(rank, buffer.clone())?;
            }
        } else {
            *buffer = self.receive(ROOT)?;
        }
        Ok(())
    }

    fn scatter(&self, send: Option<&[Word]>, chunk_len: usize) -> Result<Vec<Word>> {
        if !self.is_root() {
            return self.receive_exact(ROOT, chunk_len);
        }

        let send = send.ok_or_else(|| Error::other("scatter at the coordinator needs a buffer"))?;
        if send.len() != chunk_len * self.size() {
            return Err(Error::invalid_data(format!(
                "scatter buffer holds {} words, expected {} x {chunk_len}",
                send.len(),
                self.size()
            )));
        }

        let mut own = Vec::new();
        for rank in 0..self.size() {
            let chunk = send[rank * chunk_len..(rank + 1) * chunk_len].to_vec();
            if rank == ROOT {
                own = chunk;
            } else {
                self.send(rank, chunk)?;
            }
        }
        Ok(own)
    }

    fn gather(&self, value: Word) -> Result<Option<Vec<Word>>> {
        if !self.is_root() {
            self.send(ROOT, vec![value])?;
            return Ok(None);
        }

        let mut values = Vec::with_capacity(self.size());
        values.push(value);
        for rank in 1..self.size() {
            values.extend(self.receive_exact(rank, 1)?);
        }
        Ok(Some(values))
    }

    fn gather_varcount(
        &self,
        send: &[Word],
        layout: Option<&GatherLayout>,
    ) -> Result<Option<Vec<Word>>> {
        if !self.is_root() {
            self.send(ROOT, send.to_vec())?;
            return Ok(None);
        }

        let layout =
            layout.ok_or_else(|| Error::other("gather at the coordinator needs a layout"))?;
        if layout.counts.len() != self.size() || layout.counts[ROOT] != send.len() {
            return Err(Error::invalid_data(
                "gather layout does not match the cluster".to_string(),
            ));
        }

        let mut buffer = vec![0; layout.total];
        let own = layout.displacements[ROOT];
        buffer[own..own + send.len()].copy_from_slice(send);
        for rank in 1..self.size() {
            let data = self.receive_exact(rank, layout.counts[rank])?;
            let offset = layout.displacements[rank];
            buffer[offset..offset + data.len()].copy_from_slice(&data);
        }
        Ok(Some(buffer))
    }

    fn abort(&self, reason: &str) {
        log::error!("cluster: rank={} abort reason={reason}", self.rank);
        for (rank, outbox) in self.outbox.iter().enumerate() {
            if rank != self.rank {
                // A peer that already left cannot be told anything.
                let _ = outbox.send(Packet::Abort(reason.to_string()));
            }
        }
    }
}

/// A fixed set of ranks running the same task on their own threads.
#[derive(Debug, Clone, Copy)]
pub struct LocalCluster {
    size: usize,
}

impl LocalCluster {
    pub fn new(size: usize) -> Self {
        LocalCluster { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn communicators(&self) -> Vec<ChannelCommunicator> {
        let mut outboxes: Vec<Vec<Sender<Packet>>> =
            (0..self.size).map(|_| Vec::new()).collect();
        let mut inboxes: Vec<Vec<Receiver<Packet>>> =
            (0..self.size).map(|_| Vec::new()).collect();

        // inboxes[to] is filled in sender order, so inboxes[to][from] pairs with outboxes[from][to].
        for outbox in outboxes.iter_mut() {
            for inbox in inboxes.iter_mut() {
                let (tx, rx) = channel();
                outbox.push(tx);
                inbox.push(rx);
            }
        }

        outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outbox, inbox))| ChannelCommunicator {
                rank,
                outbox,
                inbox,
            })
            .collect()
    }

    /// Run `task` on every rank and wait for all of them. Results come back in
    /// rank order.
    pub fn run<T, F>(&self, task: F) -> Vec<Result<T>>
    where
        F: Fn(&ChannelCommunicator) -> Result<T> + Sync,
        T: Send,
    {
        let task = &task;

        thread::scope(|scope| {
            let handles: Vec<_> = self
                .communicators()
                .into_iter()
                .map(|comm| {
                    thread::Builder::new()
                        .name(format!("rank-{}", comm.rank))
                        .spawn_scoped(scope, move || task(&comm))
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| match handle {
                    Ok(handle) => handle
                        .join()
                        .unwrap_or_else(|_| Err(Error::WorkerPanicked { rank })),
                    Err(e) => Err(Error::Io(e)),
                })
                .collect()
        })
    }
}
