use std::fmt;

use inquire::{InquireError, Select, Text};
use weather_core::Geolocator;

use crate::{cli::App, render::Screen};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Search,
    Recent(String),
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Search => f.write_str("Search for a city"),
            Action::Recent(city) => write!(f, "{city}"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

fn actions(history: &[String]) -> Vec<Action> {
    let mut actions = vec![Action::Search];
    actions.extend(history.iter().cloned().map(Action::Recent));
    actions.push(Action::Quit);
    actions
}

/// `None` when the user cancelled the prompt (Esc / Ctrl-C).
fn cancelled<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn run<G>(app: &mut App, locator: &G) -> anyhow::Result<()>
where
    G: Geolocator + ?Sized,
{
    app.start(locator).await;
    print!("{}", Screen(app.view()));

    loop {
        let history: Vec<String> = app.view().history.iter().map(|b| b.city.clone()).collect();

        let Some(action) = cancelled(Select::new("What next?", actions(&history)).prompt())?
        else {
            break;
        };

        match action {
            Action::Search => {
                let Some(input) = cancelled(Text::new("City:").prompt())? else {
                    continue;
                };
                if app.submit_search(&input).await.is_none() {
                    println!("Please enter a city name.");
                    continue;
                }
            }
            Action::Recent(city) => {
                app.select_history(&city).await;
            }
            Action::Quit => break,
        }

        println!();
        print!("{}", Screen(app.view()));
    }

    Ok(())
}
