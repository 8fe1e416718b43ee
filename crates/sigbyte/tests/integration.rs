//! Integration tests for sigbyte
//!
//! The loopback tests run the whole protocol inside one process; the process
//! tests start the real receiver binary and talk to it with real signals.

use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use sigbyte::{Prompter, PEER_PROMPT};
use sigbyte_core::{
    BitSymbol, LoopbackChannel, MaskedDispatcher, NotificationChannel, ReceiveState, Transmitter,
};
use sigbyte_host_linux::SignalChannel;
use sigbyte_util::PeerId;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

const PACING: Duration = Duration::from_millis(100);

fn loopback_link() -> (Transmitter<Arc<LoopbackChannel>>, Arc<MaskedDispatcher>, PeerId) {
    let channel = Arc::new(LoopbackChannel::new());
    let receiver = Arc::new(MaskedDispatcher::new());
    let peer = PeerId::new(31337).unwrap();
    channel.register(peer, receiver.clone());
    (Transmitter::new(channel, Duration::from_millis(1)), receiver, peer)
}

#[test]
fn test_loopback_round_trip_all_values() {
    for value in 0..=255u8 {
        let channel = Arc::new(LoopbackChannel::new());
        let receiver = Arc::new(MaskedDispatcher::new());
        let peer = PeerId::new(1000 + i64::from(value)).unwrap();
        channel.register(peer, receiver.clone());

        Transmitter::new(channel, Duration::ZERO)
            .send_message(peer, value)
            .unwrap();

        assert_eq!(receiver.state(), ReceiveState::Done { value });
    }
}

#[test]
fn test_loopback_receiver_thread_wakes_on_completion() {
    let (tx, receiver, peer) = loopback_link();

    let waiter = {
        let receiver = receiver.clone();
        std::thread::spawn(move || receiver.wait_for_message())
    };

    tx.send_message(peer, 169).unwrap();

    assert_eq!(waiter.join().unwrap(), 169);
    assert_eq!(
        tx.channel().sent_symbols(),
        [1, 0, 1, 0, 1, 0, 0, 1].map(BitSymbol::from_bit).to_vec()
    );
}

#[test]
fn test_sender_prompts_then_transmits() {
    let (tx, receiver, peer) = loopback_link();
    let input = Cursor::new(format!("abc\n0\n999999\n{}\n300\n12x\n0\n", peer));
    let mut prompter = Prompter::new(input, Vec::new());

    let chosen = prompter.peer(|p| tx.channel().probe(p).is_ok()).unwrap();
    let value = prompter.value().unwrap();
    assert_eq!(chosen, peer);
    assert_eq!(value, 0);

    let output = String::from_utf8(prompter.into_output()).unwrap();
    assert_eq!(output.matches(PEER_PROMPT).count(), 4);
    assert_eq!(output.matches("Invalid or unavailable PID.").count(), 3);

    tx.send_message(chosen, value).unwrap();
    assert_eq!(receiver.wait_for_message(), 0);
}

/// Start the receiver binary with no config file in reach
fn spawn_receiver(config_home: &tempfile::TempDir) -> (Child, BufReader<ChildStdout>, PeerId) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sigbyte-recv"))
        .env_remove("SIGBYTE_CONFIG")
        .env("XDG_CONFIG_HOME", config_home.path())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut line = String::new();
    stdout.read_line(&mut line).unwrap();

    let pid = line
        .trim()
        .strip_prefix("My PID is ")
        .unwrap_or_else(|| panic!("unexpected first line: {:?}", line));
    let peer: PeerId = pid.parse().unwrap();
    assert_eq!(peer.as_raw() as u32, child.id());

    (child, stdout, peer)
}

fn send_and_collect(value: u8) -> String {
    let config_home = tempfile::tempdir().unwrap();
    let (mut child, mut stdout, peer) = spawn_receiver(&config_home);

    Transmitter::new(SignalChannel::new(), PACING)
        .send_message(peer, value)
        .unwrap();

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    assert!(child.wait().unwrap().success());
    rest
}

#[test]
fn test_process_receives_169() {
    assert_eq!(send_and_collect(169), "Received 169\n");
}

#[test]
fn test_process_boundary_values() {
    assert_eq!(send_and_collect(0), "Received 0\n");
    assert_eq!(send_and_collect(255), "Received 255\n");
}

#[test]
fn test_process_stopped_receiver_coalesces_signals() {
    let config_home = tempfile::tempdir().unwrap();
    let (mut child, mut stdout, peer) = spawn_receiver(&config_home);
    let pid = Pid::from_raw(peer.as_raw());

    // Make sure the receiver cannot run while the whole message goes out
    kill(pid, Signal::SIGSTOP).unwrap();
    assert!(matches!(
        waitpid(pid, Some(WaitPidFlag::WUNTRACED)).unwrap(),
        WaitStatus::Stopped(_, Signal::SIGSTOP)
    ));

    Transmitter::new(SignalChannel::new(), Duration::ZERO)
        .send_message(peer, 255)
        .unwrap();
    kill(pid, Signal::SIGCONT).unwrap();

    // Eight SIGUSR2 collapsed into one: the receiver is stuck at one bit
    std::thread::sleep(Duration::from_millis(300));
    assert!(child.try_wait().unwrap().is_none());

    child.kill().unwrap();
    child.wait().unwrap();

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    assert!(!rest.contains("Received"));
}

#[test]
fn test_sender_rejects_dead_pid_flag() {
    let mut reaped = Command::new("true").spawn().unwrap();
    let dead = reaped.id();
    reaped.wait().unwrap();

    let config_home = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_sigbyte-send"))
        .env_remove("SIGBYTE_CONFIG")
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["--pid", &dead.to_string(), "--value", "7"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid or unavailable PID."));
}

#[test]
fn test_sender_rejects_out_of_range_value_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_sigbyte-send"))
        .args(["--pid", "1", "--value", "300"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_sender_reports_peer_dying_mid_message() {
    // SIGUSR1's default action terminates `sleep`, so the peer dies on the
    // first symbol and is reaped before the second one goes out
    let mut child = Command::new("sleep").arg("30").spawn().unwrap();
    let pid = child.id();
    let reaper = std::thread::spawn(move || child.wait().unwrap());

    let config_home = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_sigbyte-send"))
        .env_remove("SIGBYTE_CONFIG")
        .env("XDG_CONFIG_HOME", config_home.path())
        .args(["--pid", &pid.to_string(), "--value", "0", "--pacing-ms", "200"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    let status = reaper.join().unwrap();
    assert!(!status.success());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to send signal:"));
    assert_eq!(stderr.lines().filter(|l| !l.trim().is_empty()).count(), 1);
}
