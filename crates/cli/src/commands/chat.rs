//! `fisibot chat`: Interactive or single-question tutoring.

use fisibot_core::SessionState;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::runtime;

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = runtime::load_config()?;

    if config.model.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: GOOGLE_API_KEY no configurada!");
        eprintln!();
        eprintln!("  Configúrala con:");
        eprintln!("    export GOOGLE_API_KEY='tu-clave'");
        eprintln!();
        eprintln!("  O agrégala a fisibot.toml en la sección [model].");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let agent = runtime::build_agent(&config).await?;
    let mut session = SessionState::new();

    if let Some(msg) = message {
        eprint!("  Pensando...");
        let outcome = agent.run_turn(&mut session, &msg).await?;
        eprint!("\r             \r");
        println!("{}", outcome.answer);
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║      Asistente de Física I - Modo interactivo ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Modelo:        {}", agent.model());
    println!("  Herramientas:  {}", agent.tool_names().join(", "));
    println!();
    println!("  Escribí tu consulta y presioná Enter.");
    println!("  Escribí 'salir' o Ctrl+C para terminar.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  Vos > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case("salir") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        if line.is_empty() {
            print!("  Vos > ");
            std::io::stdout().flush()?;
            continue;
        }

        eprint!("  ...");
        match agent.run_turn(&mut session, line).await {
            Ok(outcome) => {
                eprint!("\r     \r");
                println!();
                for text in outcome.answer.lines() {
                    println!("  Profesor > {text}");
                }
                if let Some(topic) = &session.last_topic {
                    println!("  [tema: {topic}]");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        print!("  Vos > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  ¡Hasta luego!");
    println!();

    Ok(())
}
