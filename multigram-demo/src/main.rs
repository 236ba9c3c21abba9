use std::env;
use std::sync::mpsc;
use std::thread;

use log::info;

use multigram_core::model::counter::{NGramCounter, build_vocabulary};
use multigram_core::model::distribution::MleDistribution;
use multigram_core::model::ngram_model::NGramModel;
use multigram_core::model::sampler::WeightedSampler;
use multigram_core::model::vocabulary::Vocabulary;
use multigram_core::model::{NGram, Token};

mod io;

/// Highest n-gram order counted by the demo.
const ORDER: usize = 3;

/// Tokens observed fewer times than this are masked to the unknown label.
const CUTOFF: usize = 2;

/// Corpus compiled into the binary, used when no file is given.
const SAMPLE_CORPUS: &str = include_str!("../data/corpus.txt");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Read the corpus from the given path, or fall back to the embedded sample
    let args: Vec<String> = env::args().collect();
    let (lines, cache_path) = match args.get(1) {
        Some(path) => (io::read_file(path)?, Some(io::build_output_path(path, "bin")?)),
        None => (SAMPLE_CORPUS.lines().map(str::to_owned).collect(), None),
    };

    // One sentence per line, lowercased and split on whitespace
    let sentences: Vec<Vec<Token>> = lines
        .iter()
        .map(|line| line.split_whitespace().map(str::to_lowercase).collect::<Vec<Token>>())
        .filter(|sentence| !sentence.is_empty())
        .collect();
    println!("Corpus: {} sentences", sentences.len());

    // Tokens below the cutoff are not vocabulary members
    let vocabulary = build_vocabulary(CUTOFF, &sentences)?;
    println!(
        "Vocabulary: {} entries (cutoff {}, unknown label {:?})",
        vocabulary.len(),
        vocabulary.cutoff(),
        vocabulary.unk_label()
    );

    // Mask rare tokens before any counting; the engine never does this itself
    let masked: Vec<Vec<Token>> = sentences
        .iter()
        .map(|sentence| sentence.iter().map(|token| vocabulary.mask(token).to_owned()).collect())
        .collect();

    // Reload cached counts when possible, rebuild otherwise
    let counter = match &cache_path {
        Some(path) if path.exists() => {
            info!("loading cached counts from {}", path.display());
            postcard::from_bytes(&std::fs::read(path)?)?
        }
        _ => {
            let counter = train_counter(&vocabulary, &masked)?;
            if let Some(path) = &cache_path {
                std::fs::write(path, postcard::to_stdvec(&counter)?)?;
                info!("cached counts at {}", path.display());
            }
            counter
        }
    };
    println!("Counted orders 1..={}", counter.order());

    // The most frequent token overall
    if let Some(top) = counter.unigrams().max() {
        println!("Most frequent token: {:?} ({} occurrences)", top, counter.unigrams().count(top));
    }

    // Asking for an order the counter never tracked is rejected
    match counter.lookup(ORDER + 1) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Lookup at order {}: {}", ORDER + 1, e),
    }

    // A conditional model over (ORDER - 1)-token contexts
    let model: NGramModel<MleDistribution> =
        NGramModel::train(ORDER - 1, &masked, MleDistribution::new);
    println!("Model: {} contexts", model.len());

    // Deterministic generation always takes the arg-max continuation
    println!("Greedy: {}", model.generate(12).join(" "));

    // Stochastic generation goes through the sampler seam
    let mut sampler = WeightedSampler::new();
    for i in 0..3 {
        println!("Sampled {}: {}", i + 1, model.generate_with(12, &mut sampler).join(" "));
    }

    // Score the first sentence under the model, in bits
    if let Some(sentence) = masked.first() {
        println!("Entropy of the first sentence: {:.3} bits", model.entropy(sentence));
    }

    Ok(())
}

/// Trains one partial counter per chunk of sentences on its own thread,
/// then merges the partial counts into a single counter.
fn train_counter(
    vocabulary: &Vocabulary,
    sentences: &[Vec<Token>],
) -> Result<NGramCounter, Box<dyn std::error::Error>> {
    // Tuple building is the caller's job, not the counting engine's
    let windowed: Vec<Vec<NGram>> =
        sentences.iter().map(|sentence| window_ngrams(sentence, ORDER)).collect();

    let cpus = num_cpus::get();
    let chunks = cpus * 8;
    let chunk_size = ((windowed.len() + chunks - 1) / chunks).max(1);
    info!("training {} sentences in chunks of {}", windowed.len(), chunk_size);

    let (tx, rx) = mpsc::channel();
    for chunk in windowed.chunks(chunk_size) {
        let tx = tx.clone();
        let chunk: Vec<Vec<NGram>> = chunk.to_vec();
        let vocabulary = vocabulary.clone();

        thread::spawn(move || {
            let partial = NGramCounter::new(ORDER, &vocabulary)
                .and_then(|mut counter| counter.train(&chunk).map(|_| counter));
            tx.send(partial).expect("failed to send from thread");
        });
    }
    drop(tx);

    let mut counter = NGramCounter::new(ORDER, vocabulary)?;
    for partial in rx.iter() {
        counter.merge(&partial?)?;
    }

    Ok(counter)
}

/// Slides a window over one sentence, producing the up-to-`order`-sized
/// tuple ending at every position.
fn window_ngrams(sentence: &[Token], order: usize) -> Vec<NGram> {
    (0..sentence.len())
        .map(|i| sentence[i.saturating_sub(order - 1)..=i].to_vec())
        .collect()
}
