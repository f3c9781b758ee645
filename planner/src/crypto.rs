// Copyright 2025 Chainflip Labs GmbH
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

//! BLS12-381 identity material and the keystore envelope. Key generation is
//! CPU-bound and runs on blocking tasks; encryption happens once per keystore
//! entry at emission time.

use aes_gcm::{
	aead::{Aead, KeyInit},
	Aes256Gcm, Nonce,
};
use blst::min_pk::SecretKey;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Truncated-hash address length, in bytes.
pub const ADDRESS_LEN: usize = 20;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const PBKDF2_ROUNDS: u32 = 600_000;

/// A freshly generated BLS12-381 key pair with its derived address.
#[derive(Debug, Clone)]
pub struct Keypair {
	pub address: String,
	pub public_key: Vec<u8>,
	pub private_key: Vec<u8>,
}

impl Keypair {
	pub fn generate() -> Result<Self> {
		let mut ikm = [0u8; 32];
		rand::rngs::OsRng.fill_bytes(&mut ikm);
		let secret = SecretKey::key_gen(&ikm, &[])
			.map_err(|err| Error::KeyGeneration(format!("{err:?}")))?;
		let public = secret.sk_to_pk().compress().to_vec();
		Ok(Keypair {
			address: address_of(&public),
			private_key: secret.to_bytes().to_vec(),
			public_key: public,
		})
	}
}

/// Address of a compressed public key: the first 20 bytes of its SHA-256
/// digest, hex encoded.
pub fn address_of(public_key: &[u8]) -> String {
	hex::encode(&Sha256::digest(public_key)[..ADDRESS_LEN])
}

/// One keystore entry: a private key sealed with AES-256-GCM under a key
/// derived from the shared passphrase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedKey {
	pub public_key: String,
	pub salt: String,
	pub nonce: String,
	pub cipher_text: String,
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; 32] {
	let mut key = [0u8; 32];
	pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
	key
}

pub fn encrypt_key(
	password: &str,
	public_key: &[u8],
	private_key: &[u8],
) -> Result<EncryptedKey> {
	let mut salt = [0u8; SALT_LEN];
	let mut nonce = [0u8; NONCE_LEN];
	rand::rngs::OsRng.fill_bytes(&mut salt);
	rand::rngs::OsRng.fill_bytes(&mut nonce);

	let cipher = Aes256Gcm::new_from_slice(&derive_key(password, &salt))
		.map_err(|err| Error::Encoding(format!("keystore cipher: {err}")))?;
	let cipher_text = cipher
		.encrypt(Nonce::from_slice(&nonce), private_key)
		.map_err(|err| Error::Encoding(format!("keystore encryption: {err}")))?;

	Ok(EncryptedKey {
		public_key: hex::encode(public_key),
		salt: hex::encode(salt),
		nonce: hex::encode(nonce),
		cipher_text: hex::encode(cipher_text),
	})
}

pub fn decrypt_key(password: &str, entry: &EncryptedKey) -> Result<Vec<u8>> {
	let salt = decode_hex("salt", &entry.salt)?;
	let nonce = decode_hex("nonce", &entry.nonce)?;
	let cipher_text = decode_hex("cipherText", &entry.cipher_text)?;

	let cipher = Aes256Gcm::new_from_slice(&derive_key(password, &salt))
		.map_err(|err| Error::Encoding(format!("keystore cipher: {err}")))?;
	cipher
		.decrypt(Nonce::from_slice(&nonce), cipher_text.as_slice())
		.map_err(|_| Error::Encoding("keystore decryption failed".to_string()))
}

pub fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>> {
	hex::decode(value).map_err(|err| Error::Encoding(format!("{field}: {err}")))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generates_distinct_keypairs() {
		let a = Keypair::generate().unwrap();
		let b = Keypair::generate().unwrap();
		assert_ne!(a.private_key, b.private_key);
		assert_ne!(a.address, b.address);
		assert_eq!(a.address.len(), ADDRESS_LEN * 2);
		assert_eq!(a.public_key.len(), 48);
		assert_eq!(a.private_key.len(), 32);
	}

	#[test]
	fn address_is_derived_from_public_key() {
		let keypair = Keypair::generate().unwrap();
		assert_eq!(keypair.address, address_of(&keypair.public_key));
	}

	#[test]
	fn keystore_round_trip() {
		let keypair = Keypair::generate().unwrap();
		let entry = encrypt_key("hunter2", &keypair.public_key, &keypair.private_key).unwrap();
		assert_eq!(decrypt_key("hunter2", &entry).unwrap(), keypair.private_key);
	}

	#[test]
	fn wrong_password_fails_to_decrypt() {
		let keypair = Keypair::generate().unwrap();
		let entry = encrypt_key("hunter2", &keypair.public_key, &keypair.private_key).unwrap();
		assert!(decrypt_key("hunter3", &entry).is_err());
	}
}
