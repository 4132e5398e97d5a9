use clap::Parser;
use stuffstore::{
    Catalog,
    Component,
    DataDir,
    cleanup,
    cli::{Cli, Command, EditArgs, StatusArgs},
    error::{self, Error},
    search,
    status,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("STUFFSTORE_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let catalog = Catalog::open(&data_dir.components_db())?;

    match cli.command {
        Command::Show(args) => {
            let component = catalog.find(args.id)?.ok_or(Error::NotFound {
                kind: "component",
                name: args.id.to_string(),
            })?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&component)?);
            } else {
                print_component(&component);
            }
        }
        Command::Edit(args) => {
            cmd_edit(&catalog, &args)?;
        }
        Command::Search(args) => {
            let report = search::execute_search(&args, &catalog);
            if args.json {
                search::format_json(&report)?;
            } else {
                search::format_human(&report);
            }
        }
        Command::Join(args) => {
            if catalog.join_set(args.id, args.set)? {
                println!("Component {} joined set {}", args.id, args.set);
            } else {
                println!("Nothing changed");
            }
        }
        Command::Leave(args) => {
            if catalog.leave_set(args.id)? {
                println!("Component {} left its set", args.id);
            } else {
                println!("Nothing changed");
            }
        }
        Command::Related(args) => {
            let related = catalog.matching_equivalence_set(args.id)?;
            if args.json {
                println!("{}", serde_json::to_string(&related)?);
            } else {
                for c in &related {
                    print_line(c);
                }
            }
        }
        Command::List(args) => {
            cmd_list(&catalog, args.json)?;
        }
        Command::Status(args) => {
            cmd_status(&catalog, &args)?;
        }
        Command::Completions(_) => {}
    }

    Ok(())
}

fn cmd_edit(catalog: &Catalog, args: &EditArgs) -> error::Result<()> {
    let result = catalog.edit(args.id, |component| {
        if !args.apply(component) {
            return false;
        }
        if !args.no_cleanup {
            cleanup::cleanup_component(component);
        }
        true
    });

    if result.committed {
        if let Some(component) = catalog.find(args.id)? {
            print_component(&component);
        }
    } else if result.message.is_empty() {
        println!("No fields given, nothing to store");
    } else {
        return Err(Error::Rejected {
            id: args.id,
            reason: result.message,
        });
    }
    Ok(())
}

fn cmd_list(catalog: &Catalog, json: bool) -> error::Result<()> {
    let mut all = Vec::new();
    catalog.iterate_all(|c| {
        all.push(c.clone());
        true
    })?;

    if json {
        println!("{}", serde_json::to_string(&all)?);
    } else if all.is_empty() {
        println!("No components stored.");
    } else {
        for c in &all {
            print_line(c);
        }
    }
    Ok(())
}

fn cmd_status(catalog: &Catalog, args: &StatusArgs) -> error::Result<()> {
    let items = status::status_range(catalog, args.offset, args.limit)?;
    if args.json {
        println!("{}", serde_json::to_string(&items)?);
        return Ok(());
    }

    for item in &items {
        if item.separator == 2 {
            println!();
        }
        println!("{:>5} {}", item.number, item.status);
    }
    Ok(())
}

fn print_line(c: &Component) {
    println!("#{:<5} [{:<5}] {:<16} {}", c.id, c.equiv_set, c.category, c.value);
}

fn print_component(c: &Component) {
    println!("id:          {}", c.id);
    println!("set:         {}", c.equiv_set);
    let fields = [
        ("category", &c.category),
        ("value", &c.value),
        ("description", &c.description),
        ("notes", &c.notes),
        ("footprint", &c.footprint),
        ("quantity", &c.quantity),
        ("datasheet", &c.datasheet_url),
    ];
    for (name, value) in fields {
        if !value.is_empty() {
            println!("{:<12} {value}", format!("{name}:"));
        }
    }
    println!("drawer:      {:?}", c.drawer_size);
    if let Some(updated) = c.updated {
        println!("updated:     {}", updated.format("%Y-%m-%d %H:%M"));
    }
}
