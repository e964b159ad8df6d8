use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};

use crate::import::ImportResult;
use loteria_core::closure::{ClosureMatch, ClosureResult, CostAnalysis, CostTier};
use loteria_core::models::NumberStats;
use loteria_core::stats::SumBand;
use loteria_core::{Draw, GenerationResult, LotteryKind};
use loteria_db::models::StoredBet;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Nenhum concurso para exibir.");
        return;
    }

    let mut table = new_table(vec!["Concurso", "Data", "Dezenas", "Soma"]);
    for draw in draws {
        table.add_row(vec![
            draw.contest().to_string(),
            draw.date().format("%d/%m/%Y").to_string(),
            format_numbers(draw.numbers()),
            draw.sum().to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Importação concluída:");
    println!("  Linhas lidas        : {}", result.total_records);
    println!("  Inseridas           : {}", result.inserted);
    println!("  Duplicadas ignoradas: {}", result.skipped);
    if result.errors > 0 {
        println!("  Erros               : {}", result.errors);
    }
}

pub fn display_stats(kind: LotteryKind, stats: &[NumberStats], window: u32, band: &SumBand) {
    println!("\n📊 {}: estatísticas dos últimos {} concursos\n", kind, window);

    let mut table = new_table(vec!["Dezena", "Frequência", "Atraso"]);

    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.number.cmp(&b.number)));

    for stat in &sorted {
        let gap = if stat.never_seen {
            Cell::new("nunca").fg(Color::Red)
        } else {
            Cell::new(stat.gap)
        };
        table.add_row(vec![
            Cell::new(format!("{:02}", stat.number)),
            Cell::new(stat.frequency),
            gap,
        ]);
    }
    println!("{table}");

    println!(
        "\nSoma média: {:.1} (faixa aceita {:.1} a {:.1})",
        band.expected, band.low, band.high
    );
}

pub fn display_bets(title: &str, bets: &[GenerationResult]) {
    println!("\n🎲 {title}\n");

    let mut table = new_table(vec!["#", "Dezenas", "Soma", "Confiança", "Raciocínio"]);
    for (i, bet) in bets.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            format_numbers(&bet.numbers),
            bet.sum.to_string(),
            format!("{:.2}", bet.confidence),
            bet.reasoning.clone(),
        ]);
    }
    println!("{table}");
}

pub fn display_stored_bets(bets: &[StoredBet]) {
    if bets.is_empty() {
        println!("Nenhuma aposta salva.");
        return;
    }

    let mut table = new_table(vec!["Id", "Criada em", "Estratégia", "Dezenas", "Soma", "Confiança"]);
    for bet in bets {
        table.add_row(vec![
            bet.id.to_string(),
            bet.created_at.clone(),
            bet.strategy.to_string(),
            format_numbers(&bet.numbers),
            bet.sum.to_string(),
            format!("{:.2}", bet.confidence),
        ]);
    }
    println!("{table}");
}

pub fn display_closure(closure: &ClosureResult, analysis: &CostAnalysis, show_games: bool) {
    println!("\n🧮 Fechamento\n");
    println!("  {}", closure.description);
    println!("  Custo por jogo       : {:.2}", analysis.cost_per_combination);
    println!("  Custo por acerto-alvo: {:.2}", analysis.break_even_odds);

    let color = match analysis.recommendation {
        CostTier::High => Color::Red,
        CostTier::Moderate => Color::Yellow,
        CostTier::Low => Color::Green,
    };
    let mut table = new_table(vec!["Recomendação"]);
    table.add_row(vec![Cell::new(analysis.recommendation.message()).fg(color)]);
    println!("{table}");

    if show_games {
        let mut table = new_table(vec!["Jogo", "Dezenas"]);
        for (i, game) in closure.combinations.iter().enumerate() {
            table.add_row(vec![(i + 1).to_string(), format_numbers(game)]);
        }
        println!("{table}");
    }
}

pub fn display_closure_match(result: &ClosureMatch, drawn: &[u8], target_hits: usize) {
    println!("\n✅ Conferência contra {}\n", format_numbers(drawn));

    let mut table = new_table(vec!["Acertos", "Jogos"]);
    for (hits, &count) in result.hit_counts.iter().enumerate().rev() {
        if count == 0 {
            continue;
        }
        let cell = Cell::new(hits);
        let cell = if hits >= target_hits { cell.fg(Color::Green) } else { cell };
        table.add_row(vec![cell, Cell::new(count)]);
    }
    println!("{table}");

    println!(
        "{} jogo(s) com {} ou mais acertos (melhor: {})",
        result.total_matches, target_hits, result.best_hits
    );
    for game in &result.matched_games {
        println!("  {}", format_numbers(game));
    }
}
