use clap::{Parser, ValueEnum};
use log::info;

use logic_rs::cdcl::Cdcl;
use logic_rs::cnf::{is_model, Clause, Cnf, Model};
use logic_rs::robdd::Robdd;
use logic_rs::types::Lit;
use logic_rs::{dpll, truth_table};

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Engine {
    Cdcl,
    Robdd,
    Dpll,
    TruthTable,
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of queens.
    #[arg(value_name = "INT", default_value = "6")]
    n: usize,

    /// Solving engine.
    #[arg(long, value_enum, default_value = "cdcl")]
    engine: Engine,

    /// Computed table size of the ROBDD engine (in bits).
    #[arg(long, value_name = "INT", default_value = "16")]
    cache_bits: usize,
}

/// Queen at row `i`, column `j`.
fn queen(n: usize, i: usize, j: usize) -> Lit {
    Lit::from_dimacs((i * n + j + 1) as i32)
}

fn encode(n: usize) -> Cnf {
    let mut cnf = Cnf::new();

    // At least one queen per row
    for i in 0..n {
        cnf.push((0..n).map(|j| queen(n, i, j)).collect());
    }

    // No two queens on the same row, column or diagonal
    for i1 in 0..n {
        for j1 in 0..n {
            for i2 in i1..n {
                for j2 in 0..n {
                    if (i2, j2) <= (i1, j1) {
                        continue;
                    }
                    let di = i2 - i1;
                    let attacks = i1 == i2
                        || j1 == j2
                        || j2 == j1 + di
                        || (j1 >= di && j2 == j1 - di);
                    if attacks {
                        cnf.push(Clause::new([-queen(n, i1, j1), -queen(n, i2, j2)]));
                    }
                }
            }
        }
    }
    cnf
}

fn print_board(n: usize, model: &Model) {
    for i in 0..n {
        let row: String = (0..n)
            .map(|j| if model.contains(&queen(n, i, j)) { " Q" } else { " ." })
            .collect();
        println!("{}", row);
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let n = args.n;
    let cnf = encode(n);
    info!(
        "Encoded {}-queens: {} variables, {} clauses",
        n,
        cnf.variables().len(),
        cnf.len()
    );

    let model = match args.engine {
        Engine::Cdcl => {
            let mut solver = Cdcl::new(&cnf);
            let model = solver.solve()?;
            println!("stats = {:?}", solver.stats());
            model
        }
        Engine::Robdd => {
            let config = logic_rs::robdd::RobddConfig {
                cache_bits: args.cache_bits,
                ..Default::default()
            };
            let bdd = Robdd::with_config(cnf.sorted_variables(), config)?;
            let root = bdd.cnf(&cnf)?;
            println!("bdd = {:?}", bdd);
            println!("solutions: {}", bdd.sat_count(root));
            bdd.model(root)
        }
        Engine::Dpll => dpll::Dpll::new(&cnf).solve(),
        Engine::TruthTable => truth_table::solve(&cnf),
    };

    match model {
        Some(model) => {
            assert!(is_model(&model, &cnf));
            print_board(n, &model);
        }
        None => println!("No solution for n = {}", n),
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
