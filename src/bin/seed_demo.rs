//! Utility to seed a demo user with habits and progress, then print their statistics
//!
//! Usage: seed_demo [user_id]

use chrono::{Duration, NaiveDate, Utc};

use habitual::config::Config;
use habitual::db::{migrations, Database, DbResult};
use habitual::models::{Category, CategoryCreate, Frequency, Habit, HabitCreate, ProgressLog, ProgressRecord};
use habitual::stats::StatisticsEngine;

/// (name, frequency, category index, every how many days it gets missed)
const DEMO_HABITS: &[(&str, Frequency, usize, i64)] = &[
    ("Morning run", Frequency::Daily, 0, 4),
    ("Drink water", Frequency::Daily, 0, 9),
    ("Read 20 pages", Frequency::Daily, 1, 3),
    ("Practice guitar", Frequency::Weekly, 1, 2),
    ("Budget review", Frequency::Monthly, 2, 5),
];

const DEMO_CATEGORIES: &[(&str, &str)] = &[("Health", "#4caf50"), ("Learning", "#2196f3"), ("Finance", "#ff9800")];

const DAYS: i64 = 30;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    let user_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.default_user_id.clone());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    println!("Database path: {}", config.database_path.display());

    let database = Database::new(&config.database_path)?;
    database.with_conn(migrations::run_migrations)?;

    let today = Utc::now().date_naive();

    let already_seeded = database.with_conn(|conn| Ok(!Category::list_for_user(conn, &user_id)?.is_empty()))?;
    if already_seeded {
        println!("User {} already has categories; skipping seed", user_id);
    } else {
        seed(&database, &user_id, today)?;
    }

    let stats = StatisticsEngine::new(&database).user_stats(&user_id)?;
    println!("Statistics for {}:", user_id);
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}

fn seed(database: &Database, user_id: &str, today: NaiveDate) -> DbResult<()> {
    database.with_conn_mut(|conn| {
        let tx = conn.transaction()?;

        let mut category_ids = Vec::new();
        for (name, color) in DEMO_CATEGORIES {
            let category = Category::create(&tx, &CategoryCreate {
                user_id: user_id.to_string(),
                name: name.to_string(),
                color: Some(color.to_string()),
                icon: None,
            })?;
            category_ids.push(category.id);
        }

        for (name, frequency, category, miss_every) in DEMO_HABITS {
            let habit = Habit::create(&tx, &HabitCreate {
                user_id: user_id.to_string(),
                name: name.to_string(),
                description: String::new(),
                frequency: *frequency,
                category_id: category_ids.get(*category).copied(),
                target_days: Some(DAYS as i32),
                start_date: Some((today - Duration::days(DAYS - 1)).to_string()),
                end_date: None,
                reminder: None,
            })?;

            for offset in (0..DAYS).rev() {
                ProgressRecord::upsert(&tx, &ProgressLog {
                    habit_id: habit.id,
                    date: today - Duration::days(offset),
                    completed: (offset + 1) % miss_every != 0,
                    notes: None,
                })?;
            }
            println!("  Seeded habit: {} ({})", habit.name, frequency.display_name());
        }

        tx.commit()?;
        Ok(())
    })
}
