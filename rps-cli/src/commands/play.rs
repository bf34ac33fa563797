use super::lobby::print_lobby;
use super::status::print_header;
use super::unreported;
use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use rps_core::{parse_stake, Address};
use rps_game::{LobbyEntry, Session};

const MENU: [&str; 6] = [
    "Refresh",
    "Create challenge",
    "Join challenge",
    "Cancel my challenge",
    "Switch account",
    "Quit",
];

fn pick_entry<'a>(prompt: &str, entries: &[&'a LobbyEntry]) -> Result<Option<&'a LobbyEntry>> {
    if entries.is_empty() {
        return Ok(None);
    }

    let mut items: Vec<String> = entries
        .iter()
        .map(|e| {
            format!(
                "#{} {} by {} for {} RPS",
                e.position,
                e.id_display(),
                e.creator_display(),
                e.stake_display()
            )
        })
        .collect();
    items.push("Back".to_string());

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;

    Ok(entries.get(selection).copied())
}

fn show_unreported<T>(result: rps_game::Result<T>) {
    if let Some(message) = unreported(result) {
        eprintln!("✗ {}", message);
    }
}

async fn create(session: &Session) -> Result<()> {
    let input: String = Input::new()
        .with_prompt("Stake amount (RPS)")
        .allow_empty(true)
        .validate_with(|value: &String| -> std::result::Result<(), String> {
            parse_stake(value).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    session.set_stake_input(input);
    show_unreported(session.create_challenge().await);
    Ok(())
}

async fn join(session: &Session) -> Result<()> {
    let view = session.lobby();
    let joinable: Vec<&LobbyEntry> = view.joinable().collect();
    if joinable.is_empty() {
        println!("No challenges you can join right now.");
        return Ok(());
    }

    let Some(entry) = pick_entry("Join which challenge?", &joinable)? else {
        return Ok(());
    };

    let confirm = Confirm::new()
        .with_prompt(format!(
            "Stake {} RPS to join {}?",
            entry.stake_display(),
            entry.id_display()
        ))
        .default(true)
        .interact()?;

    if confirm {
        show_unreported(session.join_challenge(&entry.challenge.id).await);
    }
    Ok(())
}

async fn cancel(session: &Session) -> Result<()> {
    let view = session.lobby();
    let mine: Vec<&LobbyEntry> = view.cancellable().collect();
    if mine.is_empty() {
        println!("You have no open challenges to cancel.");
        return Ok(());
    }

    let Some(entry) = pick_entry("Cancel which challenge?", &mine)? else {
        return Ok(());
    };

    let confirm = Confirm::new()
        .with_prompt(format!(
            "Cancel {} and get {} RPS back?",
            entry.id_display(),
            entry.stake_display()
        ))
        .default(false)
        .interact()?;

    if confirm {
        show_unreported(session.cancel_challenge(&entry.challenge.id).await);
    }
    Ok(())
}

async fn switch_account(session: &Session) -> Result<()> {
    if session.config().wallet_url.is_some() {
        // the provider owns the account; ask it again
        let account = session.connect().await?;
        match account {
            Some(a) => println!("Wallet account: {}", a),
            None => println!("Wallet reports no connected account."),
        }
        return Ok(());
    }

    let raw: String = Input::new()
        .with_prompt("Account address (empty to disconnect)")
        .allow_empty(true)
        .interact_text()?;

    let account = match raw.trim() {
        "" => None,
        other => match Address::parse(other) {
            Ok(address) => Some(address),
            Err(e) => {
                eprintln!("✗ {}", e);
                return Ok(());
            }
        },
    };

    if session.account() != account {
        if let Err(e) = session.select_account(account).await {
            eprintln!("Refresh failed: {}", e);
        }
    }
    Ok(())
}

/// Interactive lobby over a single session.
pub async fn handle_play(session: &Session) -> Result<()> {
    loop {
        let snapshot = session.snapshot();
        println!();
        print_header(session, &snapshot);
        println!();
        print_lobby(&snapshot.lobby());

        let selection = Select::new()
            .with_prompt("What next?")
            .items(&MENU)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                if let Err(e) = session.refresh_all().await {
                    eprintln!("Refresh failed: {}", e);
                }
            }
            1 => create(session).await?,
            2 => join(session).await?,
            3 => cancel(session).await?,
            4 => switch_account(session).await?,
            _ => break,
        }
    }

    println!("Bye!");
    Ok(())
}
