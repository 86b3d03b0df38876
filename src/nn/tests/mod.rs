mod optimizer_directed;
mod optimizer_stochastic;
mod scheduler;
