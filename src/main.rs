use std::net::TcpListener;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use rand::{thread_rng, Rng};

use gcm_attacks::cipher::Aes128;
use gcm_attacks::gcm::{aes_128_gcm_encrypt, Encryptor};
use gcm_attacks::oracle::{PaddingOracleAttack, XorCbcServer};
use gcm_attacks::recover::recover_auth_tag;
use gcm_attacks::utils::bytes_to_b64_str;

#[derive(Parser)]
#[command(about = "AES-GCM and CBC padding-oracle cryptanalysis demos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encrypt with AES-128-GCM, printing the tag and the Y0/H diagnostics
    Encrypt {
        /// 16-byte key, hex
        #[arg(long)]
        key: String,
        /// Nonce, hex, any length (12 bytes is the usual)
        #[arg(long)]
        nonce: String,
        /// Associated data, hex
        #[arg(long, default_value = "")]
        ad: String,
        /// Plaintext, hex
        plaintext: String,
    },
    /// Nonce-reuse round trip: encrypt four messages under one (key, nonce),
    /// recover the auth key from the first three, forge the fourth's tag
    Forge,
    /// Run the XOR-CBC padding oracle server
    OracleServe {
        #[arg(long)]
        port: u16,
        /// 16-byte XOR key, hex
        #[arg(long)]
        key: String,
    },
    /// Recover a plaintext from a remote padding oracle
    OracleAttack {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long)]
        port: u16,
        /// 16-byte IV, hex
        #[arg(long)]
        iv: String,
        /// Ciphertext, hex, a multiple of 16 bytes
        ciphertext: String,
    },
}

fn parse_block(s: &str) -> Result<[u8; 16]> {
    hex::decode(s)?
        .try_into()
        .map_err(|bytes: Vec<u8>| anyhow!("expected 16 bytes, got {}", bytes.len()))
}

fn encrypt(key: &str, nonce: &str, ad: &str, plaintext: &str) -> Result<()> {
    let key = parse_block(key)?;
    let nonce = hex::decode(nonce)?;
    let ad = hex::decode(ad)?;
    let plaintext = hex::decode(plaintext)?;

    let mut encryptor = Encryptor::new(Aes128::new(key), &nonce, &ad)?;
    let ciphertext = encryptor.update(&plaintext)?;
    let auth_tag = encryptor.finalize();

    println!("ciphertext: {}", bytes_to_b64_str(&ciphertext));
    println!("auth_tag:   {}", bytes_to_b64_str(&auth_tag));
    println!("Y0:         {}", bytes_to_b64_str(&encryptor.y0()));
    println!(
        "H:          {}",
        bytes_to_b64_str(&encryptor.h().to_gcm_bytes())
    );
    Ok(())
}

fn forge() -> Result<()> {
    let mut rng = thread_rng();
    let mut key = [0u8; 16];
    rng.fill(&mut key[..]);
    let mut nonce = [0u8; 12];
    rng.fill(&mut nonce[..]);

    let msg1 = aes_128_gcm_encrypt(key, &nonce, b"to: alice", b"transfer 10 coins to alice")?;
    let msg2 = aes_128_gcm_encrypt(key, &nonce, b"to: bob", b"lunch is in the fridge")?;
    let msg3 = aes_128_gcm_encrypt(key, &nonce, b"", b"see you at the meeting")?;
    let msg4 = aes_128_gcm_encrypt(key, &nonce, b"to: mallory", b"transfer every coin to mallory")?;

    println!("tag 1: {}", hex::encode(msg1.auth_tag));
    println!("tag 2: {}", hex::encode(msg2.auth_tag));
    println!("tag 3: {}", hex::encode(msg3.auth_tag));

    let forged = recover_auth_tag(
        &msg1,
        &msg2,
        &msg3,
        &msg4.ciphertext,
        &msg4.associated_data,
        &mut rng,
    )?;
    println!("forged tag for message 4:  {}", hex::encode(forged));
    println!("genuine tag for message 4: {}", hex::encode(msg4.auth_tag));
    match forged == msg4.auth_tag {
        true => println!("forgery matches"),
        false => return Err(anyhow!("forged tag does not match")),
    }
    Ok(())
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Encrypt {
            key,
            nonce,
            ad,
            plaintext,
        } => encrypt(&key, &nonce, &ad, &plaintext),
        Command::Forge => forge(),
        Command::OracleServe { port, key } => {
            let server = XorCbcServer::new(parse_block(&key)?);
            let listener = TcpListener::bind(("0.0.0.0", port))?;
            eprintln!("padding oracle listening on port {port}");
            server.serve(listener);
            Ok(())
        }
        Command::OracleAttack {
            host,
            port,
            iv,
            ciphertext,
        } => {
            let attack = PaddingOracleAttack::new(&host, port);
            let recovered = attack.recover_plaintext(&parse_block(&iv)?, &hex::decode(ciphertext)?)?;
            println!("recovered: {}", hex::encode(&recovered));
            println!("as text:   {}", String::from_utf8_lossy(&recovered));
            Ok(())
        }
    }
}
