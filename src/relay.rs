//! Relay actor implementation
//!
//! The central actor that owns the membership set and runs the broadcast loop.
//! Register, deregister and submit all travel through one ordered channel, so
//! every message is fanned out to exactly the sessions registered when the
//! loop reaches it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::SendError;
use crate::mailbox::Outbox;
use crate::types::SessionId;

/// A registered session as the relay sees it
#[derive(Debug)]
pub struct Member {
    pub id: SessionId,
    pub name: String,
    outbox: Outbox,
}

impl Member {
    pub fn new(id: SessionId, name: String, outbox: Outbox) -> Self {
        Self { id, name, outbox }
    }
}

/// Commands sent from sessions to the Relay actor
#[derive(Debug)]
pub enum RelayCommand {
    /// Add a session to the membership set
    Register { member: Member },
    /// Remove a session (no-op if absent)
    Deregister { session_id: SessionId },
    /// Broadcast an already formatted line
    Submit { line: String },
    /// Report the current membership size
    MemberCount { reply: oneshot::Sender<usize> },
}

/// The Relay actor
///
/// Owns every `Member` and is the only task that touches the set.
pub struct Relay {
    name: Arc<str>,
    members: HashMap<SessionId, Member>,
    receiver: mpsc::Receiver<RelayCommand>,
}

impl Relay {
    /// Create a relay and the handle used to reach it
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(name: &str, capacity: usize) -> (Self, RelayHandle) {
        let (sender, receiver) = mpsc::channel(capacity);
        let name: Arc<str> = Arc::from(name);
        let relay = Self {
            name: name.clone(),
            members: HashMap::new(),
            receiver,
        };
        (relay, RelayHandle { name, sender })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the broadcast loop
    ///
    /// Returns once every `RelayHandle` has been dropped.
    pub async fn run(mut self) {
        info!("Relay '{}' started", self.name);

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("Relay '{}' shutting down", self.name);
    }

    fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Register { member } => {
                info!("Session {} registered as '{}'", member.id, member.name);
                self.members.insert(member.id, member);
                debug!("Total members: {}", self.members.len());
            }
            RelayCommand::Deregister { session_id } => {
                if let Some(member) = self.members.remove(&session_id) {
                    info!("Session {} ('{}') deregistered", session_id, member.name);
                }
                debug!("Total members: {}", self.members.len());
            }
            RelayCommand::Submit { line } => {
                self.broadcast(line);
            }
            RelayCommand::MemberCount { reply } => {
                let _ = reply.send(self.members.len());
            }
        }
    }

    /// Push `line` to every member's outbox
    ///
    /// Never waits on a member. Members whose inbox is gone are pruned.
    fn broadcast(&mut self, line: String) {
        self.members.retain(|id, member| match member.outbox.push(line.clone()) {
            Ok(()) => true,
            Err(_) => {
                warn!("Session {} ('{}') is gone, pruning", id, member.name);
                false
            }
        });
    }
}

/// Cloneable handle to a running [`Relay`]
#[derive(Debug, Clone)]
pub struct RelayHandle {
    name: Arc<str>,
    sender: mpsc::Sender<RelayCommand>,
}

impl RelayHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn register(&self, member: Member) -> Result<(), SendError> {
        self.send(RelayCommand::Register { member }).await
    }

    pub async fn deregister(&self, session_id: SessionId) -> Result<(), SendError> {
        self.send(RelayCommand::Deregister { session_id }).await
    }

    /// Enqueue a formatted line for broadcast
    ///
    /// Waits only for channel capacity.
    pub async fn submit(&self, line: String) -> Result<(), SendError> {
        self.send(RelayCommand::Submit { line }).await
    }

    pub async fn member_count(&self) -> Result<usize, SendError> {
        let (reply, rx) = oneshot::channel();
        self.send(RelayCommand::MemberCount { reply }).await?;
        rx.await.map_err(|_| SendError::ChannelClosed)
    }

    async fn send(&self, cmd: RelayCommand) -> Result<(), SendError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }
}
