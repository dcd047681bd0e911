pub mod replica;
pub mod store;
#[cfg(test)]
mod test;
