use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Table};
use rps_core::format_units;
use rps_game::{Session, SessionSnapshot};

pub(crate) fn print_header(session: &Session, snapshot: &SessionSnapshot) {
    let config = session.config();
    println!("Network: {} ({})", config.network, config.rpc_url);

    match &snapshot.account {
        Some(account) => println!("Account: {}", account),
        None => {
            println!("Account: not connected");
            return;
        }
    }

    let ready = if snapshot.package_ready() { "yes" } else { "no" };
    println!("Contract ready: {}", ready);

    match snapshot.balance.data() {
        Some(balance) => println!("Balance: {} RPS", format_units(balance.total_balance)),
        None => println!("Balance: unavailable"),
    }

    if let Some(error) = snapshot.balance.error() {
        println!("  (last refresh failed: {})", error);
    }
}

pub async fn handle_status(session: &Session) -> Result<()> {
    let snapshot = session.snapshot();
    print_header(session, &snapshot);
    println!("Challenge schema: {}", session.config().schema);
    println!("Package: {}", session.config().package_id);
    Ok(())
}

pub async fn handle_balance(session: &Session) -> Result<()> {
    let snapshot = session.snapshot();
    let Some(account) = &snapshot.account else {
        println!("No account connected. Set --account or --wallet-url.");
        return Ok(());
    };

    println!("Balance for {}:", account);
    if let Some(balance) = snapshot.balance.data() {
        println!(
            "  Total: {} RPS ({} units)",
            format_units(balance.total_balance),
            balance.total_balance
        );
        println!("  Coin objects: {}", balance.coin_object_count);
    }

    let coins = snapshot.coins.data().cloned().unwrap_or_default();
    if coins.is_empty() {
        println!("No RPS coins found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Coin", "Balance (RPS)", "Version"]);
    for coin in coins {
        table.add_row(vec![
            coin.coin_object_id.to_string(),
            format_units(coin.balance),
            coin.version.to_string(),
        ]);
    }
    println!("{}", table);

    Ok(())
}
