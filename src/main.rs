//! Command-line entry point.
//!
//! Thin dispatch layer over [`Repository`]: parse operands, call the one
//! operation, print its output. Every failure surfaces as a one-line
//! message on stderr and a failing exit code.

use std::process::ExitCode;

use snapvc::{Error, MergeOutcome, Repository, Result};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let Some(command) = args.first() else {
        return Err(Error::NoCommand);
    };
    let operands = &args[1..];

    if command == "init" {
        expect_operands(operands, 0)?;
        Repository::init(".")?;
        return Ok(());
    }

    let mut repo = Repository::open(".")?;
    match command.as_str() {
        "add" => {
            expect_operands(operands, 1)?;
            repo.stage(&operands[0])
        }
        "commit" => {
            expect_operands(operands, 1)?;
            repo.commit(&operands[0]).map(|_| ())
        }
        "rm" => {
            expect_operands(operands, 1)?;
            repo.remove(&operands[0])
        }
        "log" => {
            expect_operands(operands, 0)?;
            print!("{}", repo.log()?);
            Ok(())
        }
        "global-log" => {
            expect_operands(operands, 0)?;
            print!("{}", repo.global_log()?);
            Ok(())
        }
        "find" => {
            expect_operands(operands, 1)?;
            let matches = repo.find(&operands[0])?;
            if matches.is_empty() {
                println!("Found no commit with that message.");
            }
            for id in matches {
                println!("{}", id.as_str());
            }
            Ok(())
        }
        "status" => {
            expect_operands(operands, 0)?;
            print!("{}", repo.status());
            Ok(())
        }
        "checkout" => checkout(&mut repo, operands),
        "branch" => {
            expect_operands(operands, 1)?;
            repo.branch(&operands[0])
        }
        "rm-branch" => {
            expect_operands(operands, 1)?;
            repo.remove_branch(&operands[0])
        }
        "reset" => {
            expect_operands(operands, 1)?;
            repo.reset(&operands[0])
        }
        "merge" => {
            expect_operands(operands, 1)?;
            match repo.merge(&operands[0])? {
                MergeOutcome::FastForwarded => println!("Current branch fast-forwarded."),
                MergeOutcome::Merged { conflicted: true, .. } => {
                    println!("Encountered a merge conflict.")
                }
                MergeOutcome::Merged { .. } => {}
            }
            Ok(())
        }
        _ => Err(Error::UnknownCommand),
    }
}

/// Three forms: `-- <file>` from HEAD, `<commit> -- <file>`, `<branch>`.
fn checkout(repo: &mut Repository, operands: &[String]) -> Result<()> {
    match operands {
        [dashes, file] if dashes == "--" => repo.checkout_file_from_head(file),
        [id, dashes, file] if dashes == "--" => repo.checkout_file(id, file),
        [branch] => repo.checkout_branch(branch),
        _ => Err(Error::BadOperands),
    }
}

fn expect_operands(operands: &[String], count: usize) -> Result<()> {
    if operands.len() == count {
        Ok(())
    } else {
        Err(Error::BadOperands)
    }
}
