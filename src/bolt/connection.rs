//! The connection actor: a single task owns the transport exclusively and
//! drains a FIFO of commands sent over an `mpsc` channel, each carrying a
//! `oneshot` completion sink — an actor-over-channels shape applied to the
//! full Bolt message pipeline.

use crate::bolt::framing::{read_message, write_message};
use crate::bolt::handshake::{self, BoltVersion};
use crate::bolt::message::{failure_to_error, Request, Response};
use crate::bolt::state::{ConnectionState, Event};
use crate::config::ConnectionConfig;
use crate::error::BoltError;
use crate::record::Record;
use crate::signatures::ProtocolMode;
use crate::summary::Summary;
use crate::value::{OrderedMap, Value};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

type Responder<T> = oneshot::Sender<T>;

/// Outcome of a pipelined BEGIN+RUN+PULL: each stage resolves independently,
/// with a failed stage's error propagated verbatim to the stages after it.
type PipelineOutcome = (
    Result<(), BoltError>,
    Result<RunOutcome, BoltError>,
    Result<PullOutcome, BoltError>,
);

/// Outcome of a successful `RUN`: the field names the server declared for
/// the statement, handed to every [`Record`] this stream yields.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub keys: Arc<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct PullOutcome {
    pub records: Vec<Vec<Value>>,
    pub has_more: bool,
    pub summary: Option<Summary>,
}

#[derive(Debug)]
pub(crate) enum Command {
    Hello {
        auth: OrderedMap,
        resp: Responder<Result<(), BoltError>>,
    },
    Begin {
        meta: OrderedMap,
        resp: Responder<Result<(), BoltError>>,
    },
    Run {
        query: String,
        params: OrderedMap,
        meta: OrderedMap,
        resp: Responder<Result<RunOutcome, BoltError>>,
    },
    Pull {
        n: i64,
        resp: Responder<Result<PullOutcome, BoltError>>,
    },
    Discard {
        n: i64,
        resp: Responder<Result<Option<Summary>, BoltError>>,
    },
    Commit {
        resp: Responder<Result<(), BoltError>>,
    },
    Rollback {
        resp: Responder<Result<(), BoltError>>,
    },
    Reset {
        resp: Responder<Result<(), BoltError>>,
    },
    Goodbye {
        resp: Responder<Result<(), BoltError>>,
    },
    /// Send BEGIN+RUN+PULL back-to-back before reading any reply. If an
    /// earlier step fails, later steps are still read off the wire (the
    /// server answers them `IGNORED`) but resolve with the *original*
    /// failure, not a generic ignored error.
    PipelineBeginRunPull {
        tx_meta: OrderedMap,
        query: String,
        params: OrderedMap,
        run_meta: OrderedMap,
        n: i64,
        resp: Responder<PipelineOutcome>,
    },
}

/// A handle to a running connection actor. Cloning shares the same
/// underlying task; callers never touch the transport directly.
#[derive(Clone)]
pub struct Connection {
    tx: mpsc::UnboundedSender<Command>,
    pub config: Arc<ConnectionConfig>,
    pub bolt_version: BoltVersion,
}

struct Actor<T> {
    transport: T,
    state: ConnectionState,
    mode: ProtocolMode,
}

impl<T: AsyncRead + AsyncWrite + Unpin> Actor<T> {
    fn new(transport: T, mode: ProtocolMode) -> Self {
        Actor {
            transport,
            state: ConnectionState::Connected,
            mode,
        }
    }

    fn transition(&mut self, event: Event) -> Result<(), BoltError> {
        self.state = self.state.apply(event)?;
        Ok(())
    }

    async fn send(&mut self, request: &Request) -> Result<(), BoltError> {
        let bytes = request.encode()?;
        write_message(&mut self.transport, &bytes).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Response, BoltError> {
        let bytes = read_message(&mut self.transport).await?;
        Ok(Response::decode(&bytes, self.mode)?)
    }

    /// Guard every request against the state machine before it touches the
    /// transport: e.g. `RUN` while `Failed` must not send anything.
    fn require_usable(&self) -> Result<(), BoltError> {
        if self.state.is_usable() {
            Ok(())
        } else {
            Err(BoltError::ConnectionClosed)
        }
    }

    async fn run_hello(&mut self, auth: OrderedMap) -> Result<(), BoltError> {
        self.require_usable()?;
        self.send(&Request::Hello { auth }).await?;
        match self.recv().await? {
            Response::Success(_) => {
                self.transition(Event::HelloOk)?;
                Ok(())
            }
            Response::Failure { code, message } => {
                self.transition(Event::Failure)?;
                Err(failure_to_error(code, message))
            }
            other => Err(unexpected(other)),
        }
    }

    async fn run_begin(&mut self, meta: OrderedMap) -> Result<(), BoltError> {
        self.require_usable()?;
        self.send(&Request::Begin { meta }).await?;
        match self.recv().await? {
            Response::Success(_) => {
                self.transition(Event::Begin)?;
                Ok(())
            }
            Response::Failure { code, message } => {
                self.transition(Event::Failure)?;
                Err(failure_to_error(code, message))
            }
            other => Err(unexpected(other)),
        }
    }

    async fn run_query(
        &mut self,
        query: String,
        params: OrderedMap,
        meta: OrderedMap,
        in_tx: bool,
    ) -> Result<RunOutcome, BoltError> {
        self.require_usable()?;
        self.send(&Request::Run {
            query,
            params,
            meta,
        })
        .await?;
        match self.recv().await? {
            Response::Success(meta) => {
                let event = if in_tx { Event::Run } else { Event::RunAutoCommit };
                self.transition(event)?;
                let keys = match meta.get("fields") {
                    Some(Value::List(items)) => items
                        .iter()
                        .filter_map(|v| v.coerce_string().ok().flatten())
                        .collect(),
                    _ => Vec::new(),
                };
                Ok(RunOutcome {
                    keys: Arc::new(keys),
                })
            }
            Response::Failure { code, message } => {
                self.transition(Event::Failure)?;
                Err(failure_to_error(code, message))
            }
            other => Err(unexpected(other)),
        }
    }

    async fn run_pull(&mut self, n: i64) -> Result<PullOutcome, BoltError> {
        self.require_usable()?;
        let mut meta = OrderedMap::new();
        meta.insert("n", Value::Integer(n));
        self.send(&Request::Pull { meta }).await?;
        self.collect_records().await
    }

    async fn run_discard(&mut self, n: i64) -> Result<Option<Summary>, BoltError> {
        self.require_usable()?;
        let mut meta = OrderedMap::new();
        meta.insert("n", Value::Integer(n));
        self.send(&Request::Discard { meta }).await?;
        let outcome = self.collect_records().await?;
        Ok(outcome.summary)
    }

    /// Drain `RECORD`s until the terminal `SUCCESS`/`FAILURE` for the
    /// current `PULL`/`DISCARD`.
    async fn collect_records(&mut self) -> Result<PullOutcome, BoltError> {
        let mut records = Vec::new();
        loop {
            match self.recv().await? {
                Response::Record(fields) => {
                    if tracing::enabled!(tracing::Level::TRACE) {
                        let preview: Vec<String> = fields.iter().map(Value::preview).collect();
                        tracing::trace!(fields = ?preview, "received RECORD");
                    }
                    records.push(fields);
                }
                Response::Success(meta) => {
                    let has_more = matches!(meta.get("has_more"), Some(Value::Boolean(true)));
                    if has_more {
                        self.transition(Event::PullHasMore)?;
                    } else {
                        self.transition(Event::PullLastOrDiscard)?;
                    }
                    let summary = if has_more {
                        None
                    } else {
                        Some(Summary::from_metadata(&meta))
                    };
                    return Ok(PullOutcome {
                        records,
                        has_more,
                        summary,
                    });
                }
                Response::Failure { code, message } => {
                    self.transition(Event::Failure)?;
                    return Err(failure_to_error(code, message));
                }
                other => return Err(unexpected(other)),
            }
        }
    }

    async fn run_commit(&mut self) -> Result<(), BoltError> {
        self.require_usable()?;
        self.send(&Request::Commit).await?;
        self.finish_tx().await
    }

    async fn run_rollback(&mut self) -> Result<(), BoltError> {
        self.require_usable()?;
        self.send(&Request::Rollback).await?;
        self.finish_tx().await
    }

    async fn finish_tx(&mut self) -> Result<(), BoltError> {
        match self.recv().await? {
            Response::Success(_) => {
                self.transition(Event::CommitOrRollback)?;
                Ok(())
            }
            Response::Failure { code, message } => {
                self.transition(Event::Failure)?;
                Err(failure_to_error(code, message))
            }
            other => Err(unexpected(other)),
        }
    }

    async fn run_reset(&mut self) -> Result<(), BoltError> {
        self.send(&Request::Reset).await?;
        match self.recv().await {
            Ok(Response::Success(_)) => {
                self.transition(Event::ResetOk)?;
                Ok(())
            }
            _ => {
                self.transition(Event::ResetFail)?;
                Err(BoltError::ConnectionClosed)
            }
        }
    }

    async fn run_goodbye(&mut self) -> Result<(), BoltError> {
        self.send(&Request::Goodbye).await?;
        self.transition(Event::Goodbye)?;
        Ok(())
    }

    /// Pipeline BEGIN+RUN+PULL: write all three before reading any reply.
    /// If BEGIN fails, RUN and PULL are still read off the wire (the server
    /// answers `IGNORED`) but resolve with BEGIN's failure.
    async fn run_pipeline(
        &mut self,
        tx_meta: OrderedMap,
        query: String,
        params: OrderedMap,
        run_meta: OrderedMap,
        n: i64,
    ) -> PipelineOutcome {
        if let Err(e) = self.require_usable() {
            return (Err(clone_err(&e)), Err(clone_err(&e)), Err(e));
        }
        let mut pull_meta = OrderedMap::new();
        pull_meta.insert("n", Value::Integer(n));

        // Write all three requests before consuming any response.
        for req in [
            Request::Begin { meta: tx_meta },
            Request::Run {
                query,
                params,
                meta: run_meta,
            },
            Request::Pull { meta: pull_meta },
        ] {
            if let Err(e) = self.send(&req).await {
                let e2 = clone_err(&e);
                let e3 = clone_err(&e);
                return (Err(e), Err(e2), Err(e3));
            }
        }

        let begin_result = match self.recv().await {
            Ok(Response::Success(_)) => {
                let _ = self.transition(Event::Begin);
                Ok(())
            }
            Ok(Response::Failure { code, message }) => {
                let _ = self.transition(Event::Failure);
                Err(failure_to_error(code, message))
            }
            Ok(other) => Err(unexpected(other)),
            Err(e) => Err(e),
        };

        if let Err(failure) = &begin_result {
            // BEGIN failed: RUN and PULL are IGNORED by the server but we
            // must still consume their bytes to keep the stream in sync.
            let _ = self.recv().await; // expected IGNORED for RUN
            let _ = self.recv().await; // expected IGNORED for PULL
            return (
                Err(clone_err(failure)),
                Err(clone_err(failure)),
                Err(clone_err(failure)),
            );
        }

        let run_result = match self.recv().await {
            Ok(Response::Success(meta)) => {
                let _ = self.transition(Event::Run);
                let keys = match meta.get("fields") {
                    Some(Value::List(items)) => items
                        .iter()
                        .filter_map(|v| v.coerce_string().ok().flatten())
                        .collect(),
                    _ => Vec::new(),
                };
                Ok(RunOutcome {
                    keys: Arc::new(keys),
                })
            }
            Ok(Response::Failure { code, message }) => {
                let _ = self.transition(Event::Failure);
                Err(failure_to_error(code, message))
            }
            Ok(other) => Err(unexpected(other)),
            Err(e) => Err(e),
        };

        if let Err(failure) = &run_result {
            let _ = self.recv().await; // expected IGNORED for PULL
            return (Ok(()), Err(clone_err(failure)), Err(clone_err(failure)));
        }

        let pull_result = self.collect_records().await;
        (Ok(()), run_result, pull_result)
    }

    #[instrument(skip(self))]
    async fn handle(&mut self, command: Command) {
        match command {
            Command::Hello { auth, resp } => {
                let _ = resp.send(self.run_hello(auth).await);
            }
            Command::Begin { meta, resp } => {
                let _ = resp.send(self.run_begin(meta).await);
            }
            Command::Run {
                query,
                params,
                meta,
                resp,
            } => {
                let in_tx = matches!(self.state, ConnectionState::TxReady);
                let _ = resp.send(self.run_query(query, params, meta, in_tx).await);
            }
            Command::Pull { n, resp } => {
                let _ = resp.send(self.run_pull(n).await);
            }
            Command::Discard { n, resp } => {
                let _ = resp.send(self.run_discard(n).await);
            }
            Command::Commit { resp } => {
                let _ = resp.send(self.run_commit().await);
            }
            Command::Rollback { resp } => {
                let _ = resp.send(self.run_rollback().await);
            }
            Command::Reset { resp } => {
                let _ = resp.send(self.run_reset().await);
            }
            Command::Goodbye { resp } => {
                let _ = resp.send(self.run_goodbye().await);
            }
            Command::PipelineBeginRunPull {
                tx_meta,
                query,
                params,
                run_meta,
                n,
                resp,
            } => {
                let outcome = self.run_pipeline(tx_meta, query, params, run_meta, n).await;
                let _ = resp.send(outcome);
            }
        }
    }
}

fn unexpected(response: Response) -> BoltError {
    BoltError::IllegalState {
        state: "response".into(),
        message: format!("unexpected response {response:?}"),
    }
}

/// `BoltError` carries an `io::Error`/subsystem errors that aren't `Clone`;
/// when a pipeline failure must be handed to more than one waiting future we
/// reconstruct an equivalent error from its displayable form instead.
fn clone_err(err: &BoltError) -> BoltError {
    match err {
        BoltError::ServerFailure {
            code,
            message,
            retryable,
        } => BoltError::ServerFailure {
            code: code.clone(),
            message: message.clone(),
            retryable: *retryable,
        },
        BoltError::ConnectionClosed => BoltError::ConnectionClosed,
        BoltError::HandshakeFailed => BoltError::HandshakeFailed,
        BoltError::Timeout => BoltError::Timeout,
        BoltError::Cancelled => BoltError::Cancelled,
        BoltError::Ignored => BoltError::Ignored,
        other => BoltError::IllegalState {
            state: "pipeline".into(),
            message: other.to_string(),
        },
    }
}

impl Connection {
    /// Perform the handshake and spawn the actor task that owns `transport`
    /// from here on.
    pub async fn open<T>(
        mut transport: T,
        config: Arc<ConnectionConfig>,
        proposals: [BoltVersion; 4],
    ) -> Result<Connection, BoltError>
    where
        T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let bolt_version = handshake::perform_client_handshake(&mut transport, proposals).await?;
        let mode = bolt_version.protocol_mode();
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
        let mut actor = Actor::new(transport, mode);
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                actor.handle(command).await;
            }
            debug!("connection actor shutting down, channel closed");
        });
        Ok(Connection {
            tx,
            config,
            bolt_version,
        })
    }

    async fn call<R>(
        &self,
        build: impl FnOnce(Responder<Result<R, BoltError>>) -> Command,
    ) -> Result<R, BoltError> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(build(resp_tx))
            .map_err(|_| BoltError::ConnectionClosed)?;
        resp_rx.await.map_err(|_| BoltError::ConnectionClosed)?
    }

    pub async fn hello(&self, auth: OrderedMap) -> Result<(), BoltError> {
        self.call(|resp| Command::Hello { auth, resp }).await
    }

    pub async fn begin(&self, meta: OrderedMap) -> Result<(), BoltError> {
        self.call(|resp| Command::Begin { meta, resp }).await
    }

    pub async fn run(
        &self,
        query: impl Into<String>,
        params: OrderedMap,
        meta: OrderedMap,
    ) -> Result<RunOutcome, BoltError> {
        let query = query.into();
        self.call(|resp| Command::Run {
            query,
            params,
            meta,
            resp,
        })
        .await
    }

    /// RUN a statement and hand back a [`crate::stream::RecordStream`] over
    /// its results, sized by this connection's configured `fetch_size` and
    /// `max_rows`.
    pub async fn run_and_stream(
        &self,
        query: impl Into<String>,
        params: OrderedMap,
        meta: OrderedMap,
    ) -> Result<crate::stream::RecordStream, BoltError> {
        let outcome = self.run(query, params, meta).await?;
        Ok(crate::stream::RecordStream::new(
            self.clone(),
            outcome.keys,
            self.config.fetch_size,
            self.config.max_rows,
        ))
    }

    pub async fn pull(&self, n: i64) -> Result<PullOutcome, BoltError> {
        self.call(|resp| Command::Pull { n, resp }).await
    }

    pub async fn discard(&self, n: i64) -> Result<Option<Summary>, BoltError> {
        self.call(|resp| Command::Discard { n, resp }).await
    }

    pub async fn commit(&self) -> Result<(), BoltError> {
        self.call(|resp| Command::Commit { resp }).await
    }

    pub async fn rollback(&self) -> Result<(), BoltError> {
        self.call(|resp| Command::Rollback { resp }).await
    }

    /// Cancel the in-flight operation by issuing RESET: drains pending
    /// replies as IGNORED and returns the connection to Ready, or Defunct on
    /// reset failure.
    pub async fn reset(&self) -> Result<(), BoltError> {
        self.call(|resp| Command::Reset { resp }).await
    }

    pub async fn goodbye(&self) -> Result<(), BoltError> {
        self.call(|resp| Command::Goodbye { resp }).await
    }

    pub async fn begin_run_pull(
        &self,
        tx_meta: OrderedMap,
        query: impl Into<String>,
        params: OrderedMap,
        run_meta: OrderedMap,
        n: i64,
    ) -> PipelineOutcome {
        let query = query.into();
        let (resp_tx, resp_rx) = oneshot::channel();
        if self
            .tx
            .send(Command::PipelineBeginRunPull {
                tx_meta,
                query,
                params,
                run_meta,
                n,
                resp: resp_tx,
            })
            .is_err()
        {
            return (
                Err(BoltError::ConnectionClosed),
                Err(BoltError::ConnectionClosed),
                Err(BoltError::ConnectionClosed),
            );
        }
        match resp_rx.await {
            Ok(outcome) => outcome,
            Err(_) => (
                Err(BoltError::ConnectionClosed),
                Err(BoltError::ConnectionClosed),
                Err(BoltError::ConnectionClosed),
            ),
        }
    }

    /// Query timeout enforcement: race the operation against a deadline and
    /// [`Connection::reset`] on expiry, surfacing [`BoltError::Timeout`].
    pub async fn with_timeout<F, R>(&self, future: F) -> Result<R, BoltError>
    where
        F: std::future::Future<Output = Result<R, BoltError>>,
    {
        match self.config.query_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, future).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("query exceeded its deadline, issuing RESET");
                    let _ = self.reset().await;
                    Err(BoltError::Timeout)
                }
            },
            None => future.await,
        }
    }
}

/// Turn a server-origin record's flat field list plus a `RunOutcome`'s
/// declared keys into a [`Record`].
pub fn to_record(keys: Arc<Vec<String>>, values: Vec<Value>) -> Record {
    Record::new(keys, values)
}
