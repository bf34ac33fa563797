use super::reported;
use anyhow::Result;
use rps_core::ObjectId;
use rps_game::Session;

pub async fn handle_create(session: &Session, amount: &str) -> Result<()> {
    let result = reported(session.create_challenge_with(amount).await)?;
    println!("Transaction: {}", result.digest);
    Ok(())
}

pub async fn handle_join(session: &Session, challenge: &str) -> Result<()> {
    let id = ObjectId::parse(challenge)?;
    let result = reported(session.join_challenge(&id).await)?;
    println!("Transaction: {}", result.digest);
    Ok(())
}

pub async fn handle_cancel(session: &Session, challenge: &str) -> Result<()> {
    let id = ObjectId::parse(challenge)?;
    let result = reported(session.cancel_challenge(&id).await)?;
    println!("Transaction: {}", result.digest);
    Ok(())
}
