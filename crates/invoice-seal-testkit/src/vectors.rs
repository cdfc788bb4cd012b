//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the digest, Merkle, and signature encodings so that any
//! implementation talking to the same authority produces identical
//! commitments.

use invoice_seal_core::canonical::censorship_message;
use invoice_seal_core::{
    files_merkle_root, sign_merkle_root, FileDescriptor, Identity, Sha256Digest,
};

/// The sample invoice table.
pub const INVOICE_CSV: &str = "\
# type,subtype,description,proposal token,hours,total cost
labor,dev,wrote parser,,10,400
Expense, travel, train,,0,65.5
";

/// `invoice.json` for [`INVOICE_CSV`] billed for January 2019.
pub const INVOICE_JSON: &str = concat!(
    r#"{"month":1,"year":2019,"lineitems":["#,
    r#"{"linenumber":0,"type":1,"subtype":"dev","description":"wrote parser","proposaltoken":"","hours":10.0,"totalcost":400.0},"#,
    r#"{"linenumber":1,"type":2,"subtype":"travel","description":"train","proposaltoken":"","hours":0.0,"totalcost":65.5}"#,
    r#"]}"#
);

/// A golden bundle vector.
#[derive(Debug, Clone)]
pub struct BundleVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed for the submitter's deterministic key.
    pub seed: [u8; 32],
    /// Files in bundle order: name and raw content.
    pub files: Vec<(&'static str, &'static [u8])>,
    /// Expected submitter public key (hex).
    pub public_key: &'static str,
    /// Expected SHA-256 digest of each file (hex).
    pub digests: Vec<&'static str>,
    /// Expected Merkle root (hex).
    pub merkle_root: &'static str,
    /// Expected signature over the hex root (hex).
    pub signature: &'static str,
}

impl BundleVector {
    /// File descriptors for this vector.
    pub fn descriptors(&self) -> Vec<FileDescriptor> {
        self.files
            .iter()
            .map(|(name, data)| FileDescriptor::new(*name, data))
            .collect()
    }

    pub fn identity(&self) -> Identity {
        Identity::from_seed(&self.seed)
    }
}

const INVOICE_DIGEST: &str = "4207e11e23a1f80b91c93c6a1d0fb4f08b4a46afe97f41d836828ccd3e246a38";

/// Get all golden bundle vectors.
pub fn all_vectors() -> Vec<BundleVector> {
    vec![
        BundleVector {
            name: "invoice only",
            seed: [0x01; 32],
            files: vec![("invoice.json", INVOICE_JSON.as_bytes())],
            public_key: "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c",
            digests: vec![INVOICE_DIGEST],
            // A single leaf is its own root.
            merkle_root: INVOICE_DIGEST,
            signature: "b41283333f12f36073079acb5b81f369cac48cd089ff87ba9e09e2632d2fdbb0\
                        3cfb4692230da72991091dd39c3d1c617b09ac3ee3598991ea62f2311ac47606",
        },
        BundleVector {
            name: "invoice with two attachments",
            seed: [0x01; 32],
            files: vec![
                ("invoice.json", INVOICE_JSON.as_bytes()),
                ("notes.txt", b"approved by treasury\n"),
                ("receipt.txt", b"taxi 42.00\n"),
            ],
            public_key: "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c",
            digests: vec![
                INVOICE_DIGEST,
                "6189cb0146055442c9af8355468e60e0f5eeb58f46b1ee646edb0a67c8da1ee6",
                "dd6e677f5663bca9097624340c91bbc409cfb478452b87879e22ee3c622dd1d5",
            ],
            merkle_root: "9473b9e21c75bf6d828ec292e1547425b4ef48516df089bf3143a986571492c2",
            signature: "508fd96583ba20129260799411041e339c0b9c8761ef7ce6e31c82984b9cdaf7\
                        ff9013ff6d4a58d36e776d30e0c71d33c10f05af7a806faaf19344cbd38b370a",
        },
        BundleVector {
            name: "five files, odd node at two levels",
            seed: [0x42; 32],
            files: vec![
                ("invoice.json", INVOICE_JSON.as_bytes()),
                ("f1.txt", b"file 1\n"),
                ("f2.txt", b"file 2\n"),
                ("f3.txt", b"file 3\n"),
                ("f4.txt", b"file 4\n"),
            ],
            public_key: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12",
            digests: vec![
                INVOICE_DIGEST,
                "5f5d584c5857d85af911ade1b2ae7cb593c17654282091f3ace31efd9e951360",
                "0b7e1391e807365614c548fd10a4a543cf0654268529f3fe768ed7042624c006",
                "b90ae9387f8c3b679f6bbd62649e3b0649fd2f5ab82cc174af8977671367f761",
                "76f61e3503f81ffc8ccff1db16486d49a5f602267027e5ae85ae17d0c5e041b1",
            ],
            merkle_root: "03d5b1f00d8f1149c332f352384b42f08a4384ba2d2a71c0c469a7a122c7f0a2",
            signature: "4acb273b89f9ef3a0074f2de35c87d934087392690074fd37c06fdddd103f492\
                        52654bb213b58d66ad799c5ccea63f9db306186cda0498e5ba0faecb9ef6150d",
        },
    ]
}

/// A golden censorship record over the "invoice only" bundle.
#[derive(Debug, Clone)]
pub struct AuthorityVector {
    /// Seed for the authority's deterministic key.
    pub seed: [u8; 32],
    pub public_key: &'static str,
    pub token: &'static str,
    pub merkle_root: &'static str,
    /// Expected signature over `merkle_root || token` (hex).
    pub signature: &'static str,
}

pub fn authority_vector() -> AuthorityVector {
    AuthorityVector {
        seed: [0x02; 32],
        public_key: "8139770ea87d175f56a35466c34c7ecccb8d8a91b4ee37a25df60f5b8fc9b394",
        token: "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        merkle_root: INVOICE_DIGEST,
        signature: "9f03277906b07c0b52e2bc6695498787b16c46dfb01e678ca3ebafd53c8bdfe2\
                    8a3de8c1d81c9c1fb141efda572344e00d92596ffb56b3cad2c52162ee980108",
    }
}

/// Recompute every vector and report `(name, matches, computed root)`.
///
/// Call this to verify your implementation matches the pinned encodings.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let files = v.descriptors();
            let identity = v.identity();

            let digests_match = files
                .iter()
                .zip(&v.digests)
                .all(|(f, expected)| f.digest() == *expected);
            let root = files_merkle_root(&files)
                .map(|r| r.to_hex())
                .unwrap_or_default();
            let signature = sign_merkle_root(&files, Some(&identity))
                .map(|s| s.to_hex())
                .unwrap_or_default();

            let matches = digests_match
                && files.len() == v.digests.len()
                && root == v.merkle_root
                && signature == v.signature
                && identity.public_key().to_hex() == v.public_key;

            (v.name.to_string(), matches, root)
        })
        .collect()
}

/// Sign the authority vector's message with its seed.
pub fn sign_authority_vector(v: &AuthorityVector) -> String {
    Identity::from_seed(&v.seed)
        .sign(&censorship_message(v.merkle_root, v.token))
        .to_hex()
}

/// SHA-256 of `data`, hex encoded.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256Digest::hash(data).to_hex()
}
