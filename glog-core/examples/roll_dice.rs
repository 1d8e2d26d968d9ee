//! Roll dice expressions from the command line.
//!
//! Pass notations as arguments, or run without any for a demo set.

use glog_core::dice::DiceExpression;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if !args.is_empty() {
        for notation in &args {
            demo_roll(notation, "from arguments");
        }
        return;
    }

    println!("=== GLOG dice roller ===\n");

    demo_roll("d20", "Roll-under test die");
    demo_roll("3d6", "Ability score");
    demo_roll("2d6+3", "Sword damage with a +3 bonus");
    demo_roll("4d6", "Four casting dice");
    demo_roll("d12 + -5 + 2", "Severity roll at -5 HP with 2 injuries");
    demo_roll("2x6", "A malformed notation");

    println!("\n=== Done ===");
}

fn demo_roll(notation: &str, description: &str) {
    print!("Rolling {notation} ({description})... ");
    match DiceExpression::parse(notation) {
        Ok(expr) => {
            let outcome = expr.roll();
            println!("{} = {}", outcome.dice_display(), outcome.total);
        }
        Err(e) => {
            println!("PARSE ERROR: {e}");
        }
    }
}
