use crate::error::SignalingError;
use crate::resolver::RoomParameterSource;
use crate::session::pending_candidates::PendingCandidates;
use crate::session::session_command::SessionCommand;
use crate::session::session_observer::SessionObserver;
use crate::session::termination::{TeardownGuard, TerminationReason};
use crate::signaling::{ChannelEvent, InboundChannel, MessagePoster, SignalingChannel};
use crate::transport::{PeerEvent, PeerLink, PeerLinkFactory};
use roomlink_core::{
    IceCandidate, RoomSignalingParameters, SessionDescription, SessionId, SessionState,
    SignalMessage,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 256;
const COMMAND_CAPACITY: usize = 8;

/// Collaborators a session is built from.
pub struct SessionDeps {
    pub resolver: Arc<dyn RoomParameterSource>,
    pub poster: Arc<dyn MessagePoster>,
    pub inbound: Arc<dyn InboundChannel>,
    pub peers: Arc<dyn PeerLinkFactory>,
    pub observer: Arc<dyn SessionObserver>,
}

/// Cloneable remote control for a running [`Session`].
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    command_tx: mpsc::Sender<SessionCommand>,
    state_rx: watch::Receiver<SessionState>,
    teardown: TeardownGuard,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    pub fn is_terminated(&self) -> bool {
        self.teardown.is_done()
    }

    /// Asks the session to hang up. Does nothing once teardown has started.
    pub async fn hangup(&self) {
        if self.teardown.is_done() {
            return;
        }
        if self.command_tx.send(SessionCommand::Hangup).await.is_err() {
            debug!("Session {} already finished", self.id);
        }
    }

    /// Waits until the session reaches `target` or terminates, and returns the state it is in.
    pub async fn wait_for(&self, target: SessionState) -> SessionState {
        let mut rx = self.state_rx.clone();
        match rx.wait_for(|s| *s == target || s.is_terminal()).await {
            Ok(state) => *state,
            Err(_) => SessionState::Terminated,
        }
    }
}

/// One room connection attempt, from resolving the room URL to teardown.
///
/// All session state lives on the task running [`Session::run`]; network work
/// happens on background tasks that report back over channels.
pub struct Session {
    id: SessionId,
    state: SessionState,
    state_tx: watch::Sender<SessionState>,
    teardown: TeardownGuard,

    resolver: Arc<dyn RoomParameterSource>,
    peers: Arc<dyn PeerLinkFactory>,
    observer: Arc<dyn SessionObserver>,
    signaling: Arc<SignalingChannel>,

    peer: Option<Arc<dyn PeerLink>>,
    pending: PendingCandidates,

    command_rx: mpsc::Receiver<SessionCommand>,
    resolved_tx: mpsc::Sender<Result<RoomSignalingParameters, SignalingError>>,
    resolved_rx: mpsc::Receiver<Result<RoomSignalingParameters, SignalingError>>,
    channel_tx: mpsc::Sender<ChannelEvent>,
    channel_rx: mpsc::Receiver<ChannelEvent>,
    peer_tx: mpsc::Sender<PeerEvent>,
    peer_rx: mpsc::Receiver<PeerEvent>,
    delivery_rx: mpsc::UnboundedReceiver<SignalingError>,
}

impl Session {
    pub fn new(deps: SessionDeps) -> (Self, SessionHandle) {
        let id = SessionId::new();
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (resolved_tx, resolved_rx) = mpsc::channel(1);
        let (channel_tx, channel_rx) = mpsc::channel(EVENT_CAPACITY);
        let (peer_tx, peer_rx) = mpsc::channel(EVENT_CAPACITY);
        let (signaling, delivery_rx) = SignalingChannel::new(deps.poster, deps.inbound);
        let teardown = TeardownGuard::new();

        let handle = SessionHandle {
            id,
            command_tx,
            state_rx,
            teardown: teardown.clone(),
        };

        let session = Self {
            id,
            state: SessionState::Idle,
            state_tx,
            teardown,
            resolver: deps.resolver,
            peers: deps.peers,
            observer: deps.observer,
            signaling,
            peer: None,
            pending: PendingCandidates::new(),
            command_rx,
            resolved_tx,
            resolved_rx,
            channel_tx,
            channel_rx,
            peer_tx,
            peer_rx,
            delivery_rx,
        };

        (session, handle)
    }

    /// Drives the session until it terminates and returns why it did.
    pub async fn run(mut self, room_url: String) -> TerminationReason {
        info!("Session {} connecting to room {}", self.id, room_url);
        self.start_resolving(room_url).await;

        let reason = loop {
            let step = tokio::select! {
                Some(cmd) = self.command_rx.recv() => match cmd {
                    SessionCommand::Hangup => Err(TerminationReason::LocalHangup),
                },

                Some(resolved) = self.resolved_rx.recv() => self.handle_resolved(resolved).await,

                Some(event) = self.channel_rx.recv() => self.handle_channel_event(event).await,

                Some(event) = self.peer_rx.recv() => self.handle_peer_event(event).await,

                Some(e) = self.delivery_rx.recv() => Err(TerminationReason::Failed(e)),
            };

            if let Err(reason) = step {
                break reason;
            }
        };

        self.teardown(reason).await
    }

    async fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        debug!("Session {}: {} -> {}", self.id, self.state, state);
        self.state = state;
        self.state_tx.send_replace(state);
        self.observer.on_state_changed(state).await;
    }

    async fn start_resolving(&mut self, room_url: String) {
        self.set_state(SessionState::ResolvingRoom).await;

        let resolver = Arc::clone(&self.resolver);
        let resolved_tx = self.resolved_tx.clone();
        tokio::spawn(async move {
            let result = resolver.resolve(&room_url).await;
            let _ = resolved_tx.send(result).await;
        });
    }

    async fn handle_resolved(
        &mut self,
        resolved: Result<RoomSignalingParameters, SignalingError>,
    ) -> Result<(), TerminationReason> {
        let params = Arc::new(resolved?);

        self.signaling.set_parameters(Arc::clone(&params));
        // Anything queued while resolving goes out now.
        self.signaling.request_flush();

        self.observer.on_ice_servers_ready(params.ice_servers()).await;
        let peer = self
            .peers
            .create(params.ice_servers(), self.peer_tx.clone())
            .await?;
        self.peer = Some(peer);

        self.signaling.open(self.channel_tx.clone()).await?;
        self.set_state(SessionState::AwaitingChannel).await;
        Ok(())
    }

    async fn handle_channel_event(&mut self, event: ChannelEvent) -> Result<(), TerminationReason> {
        match event {
            ChannelEvent::Opened => self.on_channel_opened().await,
            ChannelEvent::Message(text) => self.on_signal(&text).await,
            ChannelEvent::Closed => Err(SignalingError::Channel(
                "channel closed by the room service".to_owned(),
            )
            .into()),
            ChannelEvent::Error { code, description } => Err(SignalingError::Channel(format!(
                "channel error {code}: {description}"
            ))
            .into()),
        }
    }

    async fn on_channel_opened(&mut self) -> Result<(), TerminationReason> {
        if self.state != SessionState::AwaitingChannel {
            warn!("Ignoring channel open in state {}", self.state);
            return Ok(());
        }
        self.set_state(SessionState::Negotiating).await;

        info!("Creating offer");
        let offer = self.peer()?.create_offer().await?;
        self.on_local_description(offer).await?;
        Ok(())
    }

    async fn on_local_description(&mut self, desc: SessionDescription) -> Result<(), SignalingError> {
        info!("Sending {}", desc.kind);
        self.peer()?.set_local_description(desc.clone()).await?;
        self.signaling.enqueue_signal(&SignalMessage::from(desc))
    }

    async fn on_signal(&mut self, text: &str) -> Result<(), TerminationReason> {
        if !self.state.accepts_signals() {
            warn!("Dropping signal received in state {}", self.state);
            return Ok(());
        }

        let message = SignalMessage::from_json(text).map_err(|e| {
            debug!("Undecodable signal: {}", e);
            SignalingError::unexpected_message(text)
        })?;

        match message {
            SignalMessage::Candidate {
                label,
                id,
                candidate,
            } => {
                let candidate = IceCandidate::new(id, label, candidate);
                match self.pending.admit(candidate) {
                    Some(candidate) => self.apply_candidate(candidate).await,
                    None => debug!("Queued remote candidate ({} pending)", self.pending.len()),
                }
            }

            SignalMessage::Answer { sdp } => {
                self.peer()?
                    .set_remote_description(SessionDescription::answer(sdp))
                    .await?;

                let queued = self.pending.release();
                info!(
                    "Remote description accepted; applying {} queued candidates",
                    queued.len()
                );
                for candidate in queued {
                    self.apply_candidate(candidate).await;
                }
            }

            SignalMessage::Bye => return Err(TerminationReason::RemoteHangup),

            SignalMessage::Offer { .. } => {
                return Err(SignalingError::unexpected_message(text).into());
            }
        }

        Ok(())
    }

    async fn apply_candidate(&self, candidate: IceCandidate) {
        let Some(peer) = &self.peer else {
            return;
        };
        if let Err(e) = peer.add_ice_candidate(candidate).await {
            warn!("Failed to add remote ICE candidate: {}", e);
        }
    }

    async fn handle_peer_event(&mut self, event: PeerEvent) -> Result<(), TerminationReason> {
        match event {
            PeerEvent::LocalCandidate(candidate) => {
                self.signaling
                    .enqueue_signal(&SignalMessage::from(candidate))?;
            }
            PeerEvent::Connected => {
                if self.state == SessionState::Negotiating {
                    info!("Session {} connected", self.id);
                    self.set_state(SessionState::Connected).await;
                }
            }
            PeerEvent::Failed(reason) => {
                return Err(SignalingError::PeerConnection(reason).into());
            }
        }
        Ok(())
    }

    fn peer(&self) -> Result<Arc<dyn PeerLink>, SignalingError> {
        self.peer
            .clone()
            .ok_or_else(|| SignalingError::PeerConnection("no peer connection yet".to_owned()))
    }

    /// Releases everything the session holds. Runs at most once.
    async fn teardown(&mut self, reason: TerminationReason) -> TerminationReason {
        if !self.teardown.try_begin() {
            return reason;
        }

        match &reason {
            TerminationReason::Failed(e) => warn!("Session {} failed: {}", self.id, e),
            _ => info!("Session {} ending: {}", self.id, reason),
        }

        if let Some(peer) = self.peer.take() {
            if let Err(e) = peer.close().await {
                warn!("Failed to close peer connection: {}", e);
            }
        }

        match SignalMessage::Bye.to_json() {
            Ok(bye) => {
                if let Err(e) = self.signaling.deliver(bye).await {
                    warn!("Could not deliver bye: {}", e);
                }
            }
            Err(e) => warn!("Could not encode bye: {}", e),
        }

        self.signaling.close().await;
        self.set_state(SessionState::Terminated).await;
        self.observer.on_terminated(&reason).await;

        reason
    }
}
