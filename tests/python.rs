//! Tests communication with a python3 XML-RPC server.

use xmlrpc_client::http::HttpTransport;
use xmlrpc_client::{Client, Kind};

use std::net::TcpStream;
use std::process::{Child, Command};
use std::thread::sleep;
use std::time::{Duration, Instant};

const PORT: u16 = 8000;
const URL: &str = "http://127.0.0.1:8000";

/// Kills a child process when dropped.
struct Reap(Child);

impl Drop for Reap {
    fn drop(&mut self) {
        // an error seems to mean that the process has already died, which we don't expect here
        self.0.kill().expect("process already died");
    }
}

fn setup() -> Result<Reap, ()> {
    let start = Instant::now();
    let mut child = match Command::new("python3").arg("-m").arg("xmlrpc.server").spawn() {
        Ok(child) => child,
        Err(e) => {
            eprintln!("could not start python XML-RPC server, ignoring python test ({})", e);
            return Err(());
        }
    };

    // wait until someone listens on the port or the child dies
    let mut iteration = 0;
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            panic!("python process unexpectedly died: {}", status);
        }

        // try to connect to the server
        if TcpStream::connect(("127.0.0.1", PORT)).is_ok() {
            // server should work now
            println!("connected to server after {:?} (iteration {})", start.elapsed(), iteration);
            return Ok(Reap(child));
        }

        sleep(Duration::from_millis(50));

        iteration += 1;
    }
}

fn run_tests() {
    let transport = HttpTransport::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();
    let client = Client::with_transport(URL, transport);

    let pow = client.call("pow", &[&2, &8]).unwrap();
    assert_eq!(pow.kind(), Kind::Int);
    assert_eq!(pow.int(), 2i32.pow(8));

    let sum = client.call("add", &[&2, &4]).unwrap();
    assert_eq!(sum.int(), 6);

    // call with wrong operands should return a fault
    let err = client.call("pow", &[&2, &2, &"BLA"]).unwrap_err();
    err.fault().expect("returned error was not a fault");

    // unknown methods are faults as well
    let err = client.call("doesn't exist", &[]).unwrap_err();
    err.fault().expect("returned error was not a fault");
}

fn main() {
    let mut reaper = match setup() {
        Ok(reap) => reap,
        Err(()) => return,
    };

    if let Some(status) = reaper.0.try_wait().unwrap() {
        panic!("python process unexpectedly exited: {}", status);
    }

    run_tests();

    if let Some(status) = reaper.0.try_wait().unwrap() {
        panic!("python process unexpectedly exited: {}", status);
    }
}
