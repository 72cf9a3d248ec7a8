//! The classic MPQ string hash.
//!
//! Every entry in an archive stores two hashes of its name, computed with
//! [`HashType::NameA`] and [`HashType::NameB`] when the archive was packed. They are
//! checked again on every lookup so that a damaged key is never served.

/// Number of slots in the [`HashTable`], 5 hash types with 256 character codes each
pub const HASH_TABLE_LEN: usize = 0x500;

const TABLE_SEED: u32 = 0x0010_0001;
const HASH_SEED_1: u32 = 0x7FED_7FED;
const HASH_SEED_2: u32 = 0xEEEE_EEEE;

/// Selects which channel of the [`HashTable`] a string is hashed with
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum HashType {
    /// Used by full MPQ archives to pick a hash table bucket
    TableOffset = 0,

    /// First name check, stored as `hash_a` of an entry
    NameA = 1,

    /// Second name check, stored as `hash_b` of an entry
    NameB = 2,

    /// Used by full MPQ archives to derive encryption keys
    FileKey = 3,

    /// Used by full MPQ archives to mix encryption keys
    KeyMix = 4,
}

/// Lookup table feeding the string hash
///
/// The table only depends on a fixed linear congruential generator, so it is computed once at
/// compile time and shared by every archive through [`HashTable::shared`].
#[derive(Clone, PartialEq, Eq)]
pub struct HashTable([u32; HASH_TABLE_LEN]);

static SHARED: HashTable = HashTable::generate();

impl HashTable {
    /// Regenerate the table from its seed.
    pub fn new() -> Self {
        Self::generate()
    }

    /// The process wide instance of the table.
    pub fn shared() -> &'static HashTable {
        &SHARED
    }

    const fn generate() -> Self {
        let mut table = [0u32; HASH_TABLE_LEN];
        let mut seed = TABLE_SEED;

        let mut code = 0;
        while code < 0x100 {
            let mut index = code;
            let mut kind = 0;
            while kind < 5 {
                seed = (seed * 125 + 3) % 0x2A_AAAB;
                let high = (seed & 0xFFFF) << 0x10;
                seed = (seed * 125 + 3) % 0x2A_AAAB;
                let low = seed & 0xFFFF;

                table[index] = high | low;
                index += 0x100;
                kind += 1;
            }
            code += 1;
        }

        HashTable(table)
    }

    /// Value stored for the composite key `(hash_type << 8) + code`.
    ///
    /// Codes above `0xFF` spill into the slots of the following hash types, and `None` is only
    /// returned once the key runs past the end of the table.
    pub fn get(&self, hash_type: HashType, code: u16) -> Option<u32> {
        self.0
            .get(((hash_type as usize) << 8) + code as usize)
            .copied()
    }

    /// Hash `text` on the requested channel.
    ///
    /// The text is uppercased one character at a time and walked by UTF-16 code unit. A
    /// character whose uppercase form is longer than one character, such as `ß`, is kept as is.
    /// Returns `None` when a code unit is too large to have a slot in the table, such a name can
    /// never match a stored entry.
    pub fn hash(&self, text: &str, hash_type: HashType) -> Option<u32> {
        let mut seed1 = HASH_SEED_1;
        let mut seed2 = HASH_SEED_2;

        let text: String = text.chars().map(upper).collect();
        for code in text.encode_utf16() {
            let value = self.get(hash_type, code)?;
            seed1 = value ^ seed1.wrapping_add(seed2);
            seed2 = u32::from(code)
                .wrapping_add(seed1)
                .wrapping_add(seed2)
                .wrapping_add(seed2 << 5)
                .wrapping_add(3);
        }

        Some(seed1)
    }

    /// The `(hash_a, hash_b)` pair an entry named `text` must carry.
    pub fn name_hashes(&self, text: &str) -> Option<(u32, u32)> {
        Some((
            self.hash(text, HashType::NameA)?,
            self.hash(text, HashType::NameB)?,
        ))
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HashTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HashTable({} slots)", self.0.len())
    }
}

fn upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

/// Hash `text` with the shared table.
pub fn hash_string(text: &str, hash_type: HashType) -> Option<u32> {
    HashTable::shared().hash(text, hash_type)
}
