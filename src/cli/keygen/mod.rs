//! Keygen command - prints a random invitation key

use crate::domain::invitation::InvitationKey;

pub fn run() -> anyhow::Result<()> {
    println!("{}", generate());
    Ok(())
}

fn generate() -> String {
    InvitationKey::generate().to_base64()
}
