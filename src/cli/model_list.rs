use crate::core::models::{models_in_family, ModelFamily, DEFAULT_MODEL};

/// Print the model registry grouped by family.
pub fn list_models() {
    println!("\nSupported models:\n");

    println!("Cohere:");
    for spec in models_in_family(ModelFamily::Cohere) {
        print_row(spec.id, spec.display_name);
    }

    println!("\nMeta Llama:");
    for spec in models_in_family(ModelFamily::Generic) {
        print_row(spec.id, spec.display_name);
    }

    println!("\nPick one with: ocichat -m <model-id>");
}

fn print_row(id: &str, display_name: &str) {
    let marker = if id == DEFAULT_MODEL { " (default)" } else { "" };
    println!("  {id:<34} {display_name}{marker}");
}
