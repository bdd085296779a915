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
use std::net::TcpStream;
use std::thread;

use minipar::{interpret, Interpreter};

#[test]
fn client_round_trips_through_a_server() {
    let source = "func handle(msg: string) -> string { return \"echo:\" + msg }\n\
                  s_channel srv { handle, \"echo server\", \"127.0.0.1\", 47391 }\n\
                  listen(srv)\n\
                  c_channel cli { \"127.0.0.1\", 47391 }\n\
                  print(send(cli, \"hi\"))\n\
                  print(cli.send(\"again\"))\n\
                  close(cli)";
    assert_eq!(interpret(source, ""), "echo:hi\necho:again\n");
}

#[test]
fn server_answers_plain_tcp_clients() -> std::io::Result<()> {
    let source = "var prefix: string = \"pong:\"\n\
                  func reply(msg: string) -> string { return prefix + msg }\n\
                  s_channel srv { reply, \"pong server\", \"127.0.0.1\", 47392 }\n\
                  listen(srv)";

    let interpreter = Interpreter::default();
    let runner = interpreter.runner("");
    if let Err(e) = interpreter.execute(source, &runner) {
        panic!("program failed: {e}");
    }
    assert_eq!(runner.listening_servers(), 1);

    let mut stream = TcpStream::connect(("127.0.0.1", 47392))?;
    stream.write_all(b"ping")?;

    let mut buffer = [0u8; 64];
    let read = stream.read(&mut buffer)?;
    assert_eq!(&buffer[..read], b"pong:ping");
    Ok(())
}

#[test]
fn concurrent_requests_keep_their_own_locals() {
    let source = "func hold(msg: string) -> string {\n\
                  var mine: string = msg\n\
                  sleep(0.3)\n\
                  return \"got:\" + mine\n\
                  }\n\
                  s_channel srv { hold, \"slow server\", \"127.0.0.1\", 47393 }\n\
                  listen(srv)";

    let interpreter = Interpreter::default();
    let runner = interpreter.runner("");
    if let Err(e) = interpreter.execute(source, &runner) {
        panic!("program failed: {e}");
    }

    let clients: Vec<_> = ["first", "second"]
        .into_iter()
        .map(|payload| {
            thread::spawn(move || -> std::io::Result<String> {
                let mut stream = TcpStream::connect(("127.0.0.1", 47393))?;
                stream.write_all(payload.as_bytes())?;
                let mut buffer = [0u8; 64];
                let read = stream.read(&mut buffer)?;
                Ok(String::from_utf8_lossy(&buffer[..read]).into_owned())
            })
        })
        .collect();

    let replies: Vec<String> = clients
        .into_iter()
        .map(|client| match client.join() {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => panic!("client failed: {e}"),
            Err(_) => panic!("client thread panicked"),
        })
        .collect();

    assert_eq!(replies, ["got:first", "got:second"]);
}

#[test]
fn unreachable_server_is_a_runtime_error() {
    let output = interpret(
        "c_channel cli { \"127.0.0.1\", 1 }\nprint(send(cli, \"x\"))",
        "",
    );
    assert!(output.starts_with("error[E_RUNTIME] line 2: cannot connect"), "{output}");
}

#[test]
fn closing_an_unused_channel_is_harmless() {
    assert_eq!(interpret("c_channel cli { \"127.0.0.1\", 1 }\nclose(cli)\nprint(\"ok\")", ""), "ok\n");
}
