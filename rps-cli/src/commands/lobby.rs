use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Table};
use rps_game::{LobbyAction, LobbyView, Session};

pub(crate) fn lobby_table(view: &LobbyView) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "#", "Challenge", "Creator", "Stake (RPS)", "Status", "Created", "Action",
    ]);

    for entry in &view.entries {
        let creator = if entry.is_mine {
            format!("{} (you)", entry.creator_display())
        } else {
            entry.creator_display()
        };
        let action = match entry.action {
            Some(LobbyAction::Join) => "join",
            Some(LobbyAction::Cancel) => "cancel",
            None => "",
        };

        table.add_row(vec![
            entry.position.to_string(),
            entry.id_display(),
            creator,
            entry.stake_display(),
            entry.status.label().to_string(),
            entry.created_display(),
            action.to_string(),
        ]);
    }

    table
}

pub(crate) fn print_lobby(view: &LobbyView) {
    if view.is_empty() {
        println!("No active challenges. Create one to get started!");
        return;
    }
    println!("{}", lobby_table(view));
}

pub async fn handle_lobby(session: &Session, all: bool) -> Result<()> {
    let snapshot = session.snapshot();
    if let Some(error) = snapshot.challenges.error() {
        eprintln!("Could not load challenges: {}", error);
    }

    let view = if all {
        LobbyView::build_all(
            snapshot.challenges.data().map(Vec::as_slice).unwrap_or(&[]),
            snapshot.account.as_ref(),
        )
    } else {
        snapshot.lobby()
    };

    println!("Active challenges ({}):", view.len());
    print_lobby(&view);

    // full ids, since the table truncates them
    for entry in view.entries.iter().filter(|e| e.action.is_some()) {
        println!("  {}. {}", entry.position, entry.challenge.id);
    }

    Ok(())
}
