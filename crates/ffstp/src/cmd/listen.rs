use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ffstp_frame::{FrameError, Message};
use ffstp_session::{Session, SessionError, StringSerializer};

use crate::cmd::ListenArgs;
use crate::exit::{io_error, session_error, CliError, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let listener = TcpListener::bind(&args.addr)
        .map_err(|err| io_error(&format!("bind to {} failed", args.addr), err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let (stream, peer_addr) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(err) => return Err(io_error("accept failed", err)),
        };
        let peer = peer_addr.to_string();
        tracing::info!(%peer, "connection accepted");

        let mut session = Session::from_tcp_stream(&stream, StringSerializer)
            .map_err(|err| session_error("session setup failed", err))?;

        while running.load(Ordering::SeqCst) {
            let request = match session.recv() {
                Ok(message) => message,
                Err(err) if is_clean_disconnect(&err) => {
                    tracing::info!(%peer, "peer disconnected");
                    break;
                }
                Err(err) => return Err(session_error("receive failed", err)),
            };

            print_message(&request, &peer, format);
            printed = printed.saturating_add(1);

            let response = match &args.reply {
                Some(reply) => Message::ok(reply.clone()),
                None => Message::ok(request.into_data()),
            };
            session
                .send(&response)
                .map_err(|err| session_error("reply failed", err))?;

            if let Some(count) = args.count {
                if printed >= count {
                    return Ok(SUCCESS);
                }
            }
        }
    }

    Ok(SUCCESS)
}

/// A peer that closes between frames shows up as an empty header probe.
fn is_clean_disconnect(err: &SessionError) -> bool {
    matches!(
        err,
        SessionError::Frame(FrameError::MissingData {
            expected: Some(expected),
            partial,
        }) if *expected == ffstp_frame::HEADER_PROBE_CHARS && partial.is_empty()
    )
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
