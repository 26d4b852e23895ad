//! Two-party message exchange over TCP.
//!
//! A server thread answers every request with "Bless you!" until it sees
//! a DIE status; a client thread sends a handful of OK requests and then
//! asks the server to shut down.
//!
//! Run with:
//!   cargo run --example message-exchange

use std::net::{TcpListener, TcpStream};
use std::thread;

use ffstp::frame::{Message, Status};
use ffstp::session::{Session, StringSerializer};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let server = thread::spawn(move || -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (stream, peer) = listener.accept()?;
        eprintln!("server: connection from {peer}");

        let mut session = Session::from_tcp_stream(&stream, StringSerializer)?;
        loop {
            let request = session.recv()?;
            eprintln!("server: received {request}");
            session.send(&Message::ok("Bless you!".to_string()))?;

            if request.status_as_enum() == Status::Die {
                eprintln!("server: dying...");
                return Ok(());
            }
        }
    });

    let stream = TcpStream::connect(addr)?;
    let mut session = Session::from_tcp_stream(&stream, StringSerializer)?;
    eprintln!("client: connected to {addr}");

    for _ in 0..5 {
        let response = session.request(&Message::ok("Ahooo!".to_string()))?;
        eprintln!("client: received {response}");
    }

    eprintln!("client: sending self-kill request");
    let response = session.request(&Message::die("DIE DIE DIE".to_string()))?;
    eprintln!("client: received {response}");

    server.join().expect("server thread panicked")?;
    Ok(())
}
