use std::collections::HashSet;

use uuid::Uuid;

const TOKEN_LEN: usize = 8;

/// Hands out short object identifiers that are unique within one response.
///
/// Tokens are the first eight hex digits of a random UUID; a token already
/// issued by this generator is drawn again.
#[derive(Debug, Default)]
pub struct IdGenerator {
    issued: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        loop {
            let mut token = Uuid::new_v4().simple().to_string();
            token.truncate(TOKEN_LEN);
            if self.issued.insert(token.clone()) {
                return token;
            }
        }
    }
}
