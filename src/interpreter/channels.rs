/*
 * ==========================================================================
 * MINIPAR - Parallel blocks & network channels
 * ==========================================================================
 *
 * License:
 * This file is part of the MINIPAR programming language project.
 *
 * MINIPAR is dual-licensed under the terms of:
 *   - The MIT license
 *   - The Apache License, Version 2.0
 *
 * You may choose either license to govern your use of this software.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *
 * ==========================================================================
 */


use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, info, warn};

use crate::ast::FuncDef;
use crate::error::{MiniparError, Result};
use crate::interpreter::display::value_to_string;
use crate::interpreter::Runner;
use crate::value::{lock, Value};

/* ============================================================================
 * CLIENT CHANNEL
 * ============================================================================
 */

/// Outbound endpoint bound by `c_channel`.
///
/// The connection is opened on the first `send` and kept until `close`.
/// Payloads are raw text with no framing: one write out, one read back.
pub struct ClientChannel {
    pub host: String,
    pub port: u16,
    buffer_size: usize,
    stream: Mutex<Option<TcpStream>>,
}

impl ClientChannel {
    pub fn new(host: String, port: u16, buffer_size: usize) -> Self {
        Self {
            host,
            port,
            buffer_size,
            stream: Mutex::new(None),
        }
    }

    /// Sends `data` and returns the first chunk the server answers with.
    ///
    /// # Errors
    /// Connection failures, I/O failures, and a peer that closes the
    /// connection without answering.
    pub fn send(&self, data: &str) -> Result<String> {
        let mut slot = lock(&self.stream);

        if slot.is_none() {
            let stream = TcpStream::connect((self.host.as_str(), self.port)).map_err(|e| {
                MiniparError::runtime(format!(
                    "cannot connect to {}:{}: {e}",
                    self.host, self.port
                ))
            })?;
            info!(host = %self.host, port = self.port, "channel connected");
            *slot = Some(stream);
        }

        let Some(stream) = slot.as_mut() else {
            return Err(MiniparError::runtime("channel is not connected"));
        };

        let io_error = |e: std::io::Error| {
            MiniparError::runtime(format!("channel {}:{} failed: {e}", self.host, self.port))
        };

        stream.write_all(data.as_bytes()).map_err(io_error)?;
        stream.flush().map_err(io_error)?;

        let mut buffer = vec![0u8; self.buffer_size.max(1)];
        let read = stream.read(&mut buffer).map_err(io_error)?;
        if read == 0 {
            *slot = None;
            return Err(MiniparError::runtime(format!(
                "channel {}:{} closed by peer",
                self.host, self.port
            )));
        }

        debug!(sent = data.len(), received = read, "channel round trip");
        Ok(String::from_utf8_lossy(&buffer[..read]).into_owned())
    }

    /// Shuts the connection down. Closing an unconnected channel is a no-op.
    pub fn close(&self) {
        if let Some(stream) = lock(&self.stream).take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                debug!(error = %e, "channel shutdown");
            }
            info!(host = %self.host, port = self.port, "channel closed");
        }
    }
}

/* ============================================================================
 * SERVER CHANNEL
 * ============================================================================
 */

/// Inbound endpoint bound by `s_channel`: an address and the user function
/// that answers every request.
pub struct ServerChannel {
    pub host: String,
    pub port: u16,
    pub description: String,
    handler: Arc<FuncDef>,
}

impl ServerChannel {
    pub fn new(host: String, port: u16, description: String, handler: Arc<FuncDef>) -> Self {
        Self {
            host,
            port,
            description,
            handler,
        }
    }
}

/// Binds the server's listener and serves it on a background thread.
///
/// # Behavior
/// - The bind happens before returning, so a client started right after
///   `listen` can connect
/// - Every accepted connection is served on its own thread
/// - The accept loop's handle is recorded on the runner so that hosts can
///   wait for it
pub fn listen(runner: &Runner, channel: &Arc<ServerChannel>) -> Result<()> {
    let listener = TcpListener::bind((channel.host.as_str(), channel.port)).map_err(|e| {
        MiniparError::runtime(format!(
            "cannot listen on {}:{}: {e}",
            channel.host, channel.port
        ))
    })?;

    info!(
        host = %channel.host,
        port = channel.port,
        description = %channel.description,
        "server listening"
    );

    let runner_for_loop = runner.clone();
    let channel_for_loop = Arc::clone(channel);

    let handle = thread::Builder::new()
        .name(format!("minipar-server-{}", channel.port))
        .spawn(move || accept_loop(listener, runner_for_loop, channel_for_loop))
        .map_err(|e| MiniparError::runtime(format!("cannot start server thread: {e}")))?;

    lock(&runner.servers).push(handle);
    Ok(())
}

fn accept_loop(listener: TcpListener, runner: Runner, channel: Arc<ServerChannel>) {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };

        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        debug!(%peer, "connection accepted");

        let runner = runner.clone();
        let channel = Arc::clone(&channel);

        let spawned = thread::Builder::new()
            .name(format!("minipar-conn-{peer}"))
            .stack_size(runner.options.stack_size)
            .spawn(move || serve_connection(stream, &runner, &channel));

        if let Err(e) = spawned {
            warn!(error = %e, "cannot start connection thread");
        }
    }
}

/// Answers every payload read from `stream` until the peer hangs up.
///
/// Each request calls the handler in a fresh scope rooted at the global
/// scope; its result is written back as text. A failing handler drops the
/// connection.
fn serve_connection(mut stream: TcpStream, runner: &Runner, channel: &ServerChannel) {
    let mut buffer = vec![0u8; runner.options.buffer_size.max(1)];

    loop {
        let read = match stream.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!(error = %e, "connection read failed");
                break;
            }
        };

        let request = String::from_utf8_lossy(&buffer[..read]).into_owned();
        debug!(bytes = read, handler = %channel.handler.name, "request");

        let reply = match runner.call_user_function(
            &channel.handler,
            vec![Value::String(request)],
            &runner.globals,
        ) {
            Ok(value) => value_to_string(&value),
            Err(e) => {
                warn!(error = %e, handler = %channel.handler.name, "handler failed");
                break;
            }
        };

        if let Err(e) = stream.write_all(reply.as_bytes()).and_then(|_| stream.flush()) {
            debug!(error = %e, "connection write failed");
            break;
        }
    }

    debug!("connection closed");
}
