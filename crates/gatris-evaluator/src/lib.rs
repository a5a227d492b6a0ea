//! Heuristic move search and fitness evaluation for simulated Tetris games.
//!
//! The evaluator turns a weight vector into a number the optimizer can rank:
//!
//! ```text
//! FitnessEvaluator (play N games, sum game scores)
//!     ↓ uses
//! MoveSearch (pick the best placement for the next piece)
//!     ↓ uses
//! MoveSimulator + HeuristicScorer (simulate one placement, score the result)
//! ```
//!
//! Exploration never touches the authoritative [`GameState`](gatris_engine::GameState):
//! every candidate placement is applied to a scratch board owned by the simulator, and
//! only the chosen move is applied to the game.

pub mod fitness;
pub mod heuristic;
pub mod move_search;
pub mod move_simulator;
