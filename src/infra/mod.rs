pub mod key_claims;
#[cfg(test)]
pub mod memory;
pub mod supabase;
