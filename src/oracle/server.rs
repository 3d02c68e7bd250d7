//! Server side: the padding oracle itself.
//!
//! The "cipher" is deliberately a toy: one block decrypts as
//! P = Q ^ C ^ K, which leaks through padding validation exactly like real
//! CBC does and keeps the oracle self-contained. A thread per connection
//! stands in for the classic accept-and-fork loop; nothing is shared
//! between clients beyond the key.

use std::io::Read;
use std::net::{TcpListener, TcpStream};
use std::thread;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{Block, BLOCK_SIZE};

#[derive(Clone, Copy)]
pub struct XorCbcServer {
    key: Block,
}

impl XorCbcServer {
    pub fn new(key: Block) -> XorCbcServer {
        XorCbcServer { key }
    }

    /// Accept clients forever, one thread each. Per-connection failures are
    /// logged and do not take the listener down.
    pub fn serve(&self, listener: TcpListener) {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let server = *self;
                    thread::spawn(move || {
                        if let Err(e) = server.handle_client(stream) {
                            eprintln!("oracle client failed: {e}");
                        }
                    });
                }
                Err(e) => eprintln!("failed to accept client: {e}"),
            }
        }
    }

    /// Run one oracle session: read the target ciphertext block, then
    /// answer batches of Q blocks until the client sends a zero count.
    pub fn handle_client(&self, mut client: TcpStream) -> std::io::Result<()> {
        let mut ciphertext = [0u8; BLOCK_SIZE];
        client.read_exact(&mut ciphertext)?;

        loop {
            let count = client.read_u16::<LittleEndian>()?;
            if count == 0 {
                break;
            }
            for _ in 0..count {
                let mut q = [0u8; BLOCK_SIZE];
                client.read_exact(&mut q)?;

                let cleartext = self.decrypt(&q, &ciphertext);
                client.write_u8(validate_padding(&cleartext) as u8)?;
            }
        }
        Ok(())
    }

    fn decrypt(&self, q: &Block, ciphertext: &Block) -> Block {
        let mut cleartext = [0u8; BLOCK_SIZE];
        for i in 0..BLOCK_SIZE {
            cleartext[i] = q[i] ^ ciphertext[i] ^ self.key[i];
        }
        cleartext
    }
}

/// Strict PKCS#7: the final byte names a count in 1..=16 and that many
/// trailing bytes all carry it.
fn validate_padding(block: &Block) -> bool {
    let padding_count = block[BLOCK_SIZE - 1] as usize;
    if padding_count == 0 || padding_count > BLOCK_SIZE {
        return false;
    }
    block[BLOCK_SIZE - padding_count..]
        .iter()
        .all(|&byte| byte == padding_count as u8)
}
