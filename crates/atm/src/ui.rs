//! The interactive page: header, current view and a selection of its buttons.

use crate::utils::{format_confirmation, print_alert, print_page};
use atm_bridge::{Action, RpcEnvironment, Session};
use dialoguer::Select;
use eyre::Result;
use yansi::Paint;

const QUIT: &str = "Quit";

/// Runs the page until the user quits, re-rendering after every transition.
pub async fn run(mut session: Session<RpcEnvironment>) -> Result<()> {
    loop {
        let view = session.render();
        print_page(&view);

        let buttons = view.buttons();
        if buttons.is_empty() {
            return Ok(());
        }
        let Some(action) = select(&buttons).await? else {
            return Ok(());
        };

        let amount = session.amount();
        match session.trigger(action).await {
            Ok(Some(tx)) => {
                let name = if action == Action::Deposit { "Deposit" } else { "Withdrawal" };
                println!("{}", format_confirmation(name, amount, session.units(), &tx).green());
            }
            Ok(None) => {}
            Err(err) if err.is_alert() => print_alert(&err),
            Err(err) => return Err(err.into()),
        }
        println!();
    }
}

/// Prompts for one of `buttons`, `None` when the user quits.
async fn select(buttons: &[(Action, String)]) -> Result<Option<Action>> {
    let items: Vec<String> =
        buttons.iter().map(|(_, label)| label.clone()).chain([QUIT.to_string()]).collect();
    let choice = tokio::task::spawn_blocking(move || {
        Select::new().with_prompt("Choose an action").items(&items).default(0).interact_opt()
    })
    .await??;
    Ok(choice.and_then(|index| buttons.get(index)).map(|&(action, _)| action))
}
