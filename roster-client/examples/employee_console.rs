// roster-client/examples/employee_console.rs
// Line-oriented front end for the employee board
//
// Usage:
//   cargo run -p roster-client --example employee_console            # site from ROSTER_* / .env
//   cargo run -p roster-client --example employee_console -- --memory

use std::io::{self, BufRead, Write};

use chrono::NaiveDate;
use roster_client::{
    ClientConfig, DirectoryService, DirectoryUser, EmployeeBoard, EmployeeRecord, EmployeeStore,
    InMemoryDirectory, InMemoryList, ListService, Outcome, PickerSelection, Prompt,
};

struct ConsolePrompt;

impl Prompt for ConsolePrompt {
    fn alert(&self, message: &str) {
        println!("! {}", message);
    }

    fn confirm(&self, message: &str) -> bool {
        matches!(read_line(&format!("{} [y/N] ", message)).as_deref(), Some("y" | "Y"))
    }
}

fn read_line(label: &str) -> Option<String> {
    print!("{}", label);
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn print_record(record: &EmployeeRecord) {
    let joined = record
        .joined_on()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".into());
    println!(
        "{:>4}  {:<18} {:<20} {:<14} {:<26} {:<10} {}",
        record.id,
        record.employee_id.as_deref().unwrap_or("-"),
        record.name,
        record.department.as_deref().unwrap_or("-"),
        record.email.as_deref().unwrap_or("-"),
        joined,
        record.person_label(),
    );
}

async fn fill_and_add<L, D>(board: &mut EmployeeBoard<L, D, ConsolePrompt>) -> Outcome
where
    L: ListService,
    D: DirectoryService,
{
    let form = board.form_mut();
    form.employee_id = read_line("Employee ID (blank = auto): ").unwrap_or_default();
    form.name = read_line("Name: ").unwrap_or_default();
    form.department = read_line("Department: ").unwrap_or_default();
    form.email = read_line("Email: ").unwrap_or_default();
    form.date_of_joining = read_line("Date of joining (YYYY-MM-DD, blank = none): ")
        .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok());

    if let Some(person) = read_line("Person (login or email, blank = none): ").filter(|p| !p.is_empty()) {
        let selection = PickerSelection::default().with_text(person.clone()).with_email(person);
        board.select_people(vec![selection]);
    }

    board.add().await
}

async fn run<L, D>(mut board: EmployeeBoard<L, D, ConsolePrompt>) -> anyhow::Result<()>
where
    L: ListService,
    D: DirectoryService,
{
    board.load().await;
    println!("Commands: list | add | edit <id> | delete <id> | find <EmployeeID> | quit");

    while let Some(line) = read_line("> ") {
        let mut parts = line.splitn(2, ' ');
        let command = parts.next().unwrap_or_default();
        let arg = parts.next().unwrap_or_default().trim();

        let outcome = match command {
            "" => continue,
            "quit" | "exit" => break,
            "list" => {
                let outcome = board.load().await;
                board.employees().iter().for_each(print_record);
                outcome
            }
            "add" => fill_and_add(&mut board).await,
            "edit" => {
                let Ok(id) = arg.parse::<i64>() else {
                    println!("usage: edit <id>");
                    continue;
                };
                if board.start_edit(id) != Outcome::Done {
                    println!("unknown id {}", id);
                    continue;
                }
                let current = board.editing().map(|e| e.department.clone()).unwrap_or_default();
                let department = read_line(&format!("Department [{}]: ", current)).unwrap_or_default();
                board.set_edit_department(department);
                board.save_edit().await
            }
            "delete" => match arg.parse::<i64>() {
                Ok(id) => board.delete(id).await,
                Err(_) => {
                    println!("usage: delete <id>");
                    continue;
                }
            },
            "find" => {
                board.set_lookup_id(arg);
                let outcome = board.lookup().await;
                if let Some(record) = board.lookup_result() {
                    print_record(record);
                }
                outcome
            }
            other => {
                println!("unknown command '{}'", other);
                continue;
            }
        };
        tracing::debug!(command, ?outcome, "Command finished");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    roster_client::logger::init_logger_with_file(Some("warn"), std::env::var("ROSTER_LOG_DIR").ok().as_deref());

    if std::env::args().any(|a| a == "--memory") {
        let directory = InMemoryDirectory::new()
            .with_user(
                DirectoryUser::new(1, "Ann Lee")
                    .with_email("ann@contoso.com")
                    .with_login_name("i:0#.f|membership|ann@contoso.com"),
            )
            .with_provisioning(true);
        let list = InMemoryList::new().with_directory(directory.clone());
        let store = EmployeeStore::new(list, directory, Default::default());
        return run(EmployeeBoard::new(store, ConsolePrompt)).await;
    }

    let config = ClientConfig::from_dotenv();
    let store = EmployeeStore::from_config(&config)?;
    run(EmployeeBoard::new(store, ConsolePrompt)).await
}
