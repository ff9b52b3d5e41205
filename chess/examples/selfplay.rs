// Greedy self-play: each side picks the successor with the best static evaluation

use raychess::position::{PrettyStyle, KING_SLOT};
use raychess::{eval, movegen, Color, MoveTable, Position, Promotion};

const MAX_PLIES: usize = 60;

fn main() {
    let table = MoveTable::build();
    let mut pos = Position::initial();
    let mut side = Color::White;

    for ply in 1..=MAX_PLIES {
        let succ = movegen::expand_with(&table, &pos, side, Promotion::Queen);
        let best = match succ
            .into_iter()
            .max_by_key(|p| eval::evaluate(p, side))
        {
            Some(best) => best,
            None => {
                println!("{:?} has no moves", side);
                break;
            }
        };
        pos = best;

        println!("Ply {}, {:?} moved: {}", ply, side, pos);
        println!("{}", pos.pretty(PrettyStyle::Utf8));
        println!("Score for White: {}", eval::evaluate(&pos, Color::White));
        println!();

        if pos.slot(side.inv(), KING_SLOT).is_captured() {
            println!("{:?} lost the king", side.inv());
            break;
        }
        side = side.inv();
    }
}
