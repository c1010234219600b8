//! `fisibot search`: Query the document index without the model.

use crate::runtime;

pub async fn run(query: &str, top_k: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let config = runtime::load_config()?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k).max(1);

    let retriever = runtime::build_retriever(&config).await?;
    let fragments = retriever.try_search(query, top_k).await?;

    if fragments.is_empty() {
        println!("  No se encontraron documentos para: {query}");
        return Ok(());
    }

    println!("  {} fragmento(s) para: {query}", fragments.len());
    println!();
    for fragment in &fragments {
        println!("{}", fragment.render());
    }

    Ok(())
}
