use std::time::Duration;

use site_widgets::calendar::{CalendarProps, CalendarView, CalendarWidget};
use site_widgets::presence::{ActivityTime, PresenceProps, PresenceView, PresenceWidget};
use site_widgets::theme::ThemeSignal;
use site_widgets::WidgetClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("now_playing=info,site_widgets=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let discord_id = args.next().unwrap_or_else(|| "94490510688792576".to_string());
    let github_user = args.next().unwrap_or_else(|| "octocat".to_string());

    let client = WidgetClient::new();
    let theme = ThemeSignal::from_attribute(Some("dark"));
    let _observer = theme.observe(|scheme| println!("theme is now {scheme}"));

    let mut calendar = CalendarWidget::new(
        client.clone(),
        CalendarProps::new(github_user),
        theme.subscribe(),
    );
    calendar.load().await;
    match calendar.view() {
        CalendarView::Ready(data) => {
            println!(
                "{} contributions in {} across {} days",
                data.total.unwrap_or_default(),
                data.year,
                data.cells.len()
            );
            for cell in data.cells.iter().rev().take(7) {
                println!("  {} {:>3} {}", cell.date, cell.count, cell.color);
            }
        }
        CalendarView::Unavailable { message } => println!("{message}"),
        CalendarView::Loading => {}
    }

    let mut presence = PresenceWidget::new(client, PresenceProps::new(discord_id));
    presence.refresh().await;
    for _ in 0..3 {
        match presence.view() {
            PresenceView::Ready(panel) => match panel.activity {
                Some(card) => {
                    let name = card.name.unwrap_or_default();
                    match card.time {
                        Some(ActivityTime::Elapsed(elapsed)) => println!("{name}: {elapsed}"),
                        Some(ActivityTime::Playback(p)) => println!(
                            "{name}: {} / {} ({:.0}%)",
                            p.current_time, p.total_time, p.progress
                        ),
                        None => println!("{name}"),
                    }
                }
                None => println!("{} is {}: No status!", panel.display_name, panel.status),
            },
            PresenceView::Unavailable { message, steps } => {
                println!("{message}");
                for (i, step) in steps.iter().enumerate() {
                    println!("  {}. {step}", i + 1);
                }
                break;
            }
            PresenceView::Loading => {}
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    theme.set_attribute(Some("light"));
    tokio::time::sleep(Duration::from_millis(50)).await;
}
