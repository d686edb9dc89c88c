//! One expansion step: the successors of a graph context.
//!
//! Moves are tried in a fixed order and the first kind that applies wins:
//!
//! 1. wire control: the first unconnected control source goes to each
//!    unconnected control sink, one successor per sink;
//! 2. wire data: the first unconnected symbol sink whose owner already has
//!    incoming control gets one successor per assignable symbol supplied
//!    there;
//! 3. insert a proc: when nothing on offer fits that sink, splice a new node
//!    into the control edge feeding its owner, one successor per catalog
//!    output slot of a fitting type.
//!
//! Every successor is built with the context's mutation operations, so the
//! receiver is never changed.

use tracing::trace;

use flowsynth_check::GraphContext;
use flowsynth_core::connector::{ControlSink, ControlSource, SymbolSink, SymbolSource};
use flowsynth_core::edge::ControlFlow;
use flowsynth_core::node::ProcNode;
use flowsynth_core::types::TypeSystem;

/// The successors of `ctx`. Empty once neither network has loose ends left,
/// or when no loose symbol sink can be reached yet.
pub fn synthesize_next_generation<S: TypeSystem>(ctx: &GraphContext<S>) -> Vec<GraphContext<S>> {
    if ctx.unconnected_symbol_sinks().is_empty() && ctx.unconnected_control_sources().is_empty() {
        return Vec::new();
    }

    if let Some(source) = ctx.unconnected_control_sources().first() {
        return connect_control(ctx, source);
    }

    let Some((sink, feeding)) = pick_symbol_sink(ctx) else {
        trace!("no unconnected symbol sink has incoming control");
        return Vec::new();
    };
    let Some(ty) = ctx.symbol_sink_type(sink) else {
        return Vec::new();
    };

    let connected = connect_symbol(ctx, sink, feeding, &ty);
    if !connected.is_empty() {
        return connected;
    }
    insert_procs(ctx, sink, feeding, &ty)
}

fn connect_control<S: TypeSystem>(ctx: &GraphContext<S>, source: &ControlSource) -> Vec<GraphContext<S>> {
    trace!(%source, "connecting control");
    ctx.unconnected_control_sinks()
        .iter()
        .map(|sink| ctx.connect_control_flow(source.clone(), sink.clone()))
        .collect()
}

/// The first unconnected symbol sink whose owning control sink is fed, with
/// the control source feeding it.
fn pick_symbol_sink<S: TypeSystem>(ctx: &GraphContext<S>) -> Option<(&SymbolSink, &ControlSource)> {
    ctx.unconnected_symbol_sinks()
        .iter()
        .find_map(|sink| Some((sink, ctx.edge_sink_to_source(&sink.control_sink())?)))
}

fn connect_symbol<S: TypeSystem>(
    ctx: &GraphContext<S>,
    sink: &SymbolSink,
    feeding: &ControlSource,
    ty: &S::Type,
) -> Vec<GraphContext<S>> {
    let types = ctx.types();
    ctx.get_supply(feeding)
        .into_iter()
        .filter(|symbol| types.is_assignable(&symbol.ty, ty))
        .map(|symbol| {
            trace!(symbol = %symbol.source, %sink, "connecting data");
            ctx.connect_data_flow(symbol.source.clone(), sink.clone())
        })
        .collect()
}

fn insert_procs<S: TypeSystem>(
    ctx: &GraphContext<S>,
    sink: &SymbolSink,
    feeding: &ControlSource,
    ty: &S::Type,
) -> Vec<GraphContext<S>> {
    let Some(id) = ctx.graph().next_node_id() else {
        trace!(%sink, "no node id left for an insertion");
        return Vec::new();
    };
    let target = sink.control_sink();
    let edge = ControlFlow::new(feeding.clone(), target.clone());
    let spliced = ctx.remove_control_flow(&edge);
    let types = ctx.types();

    let mut successors = Vec::new();
    for (proc_id, proc) in ctx.catalog().iter() {
        for (flow, slots) in &proc.output_flows {
            for (slot, out) in slots {
                if !types.is_assignable(&out.ty, ty) {
                    continue;
                }
                trace!(proc = %proc_id, %flow, slot = %slot, %sink, "inserting proc");
                let node = ProcNode::new(id, proc_id.clone());
                let successor = spliced
                    .connect_control_flow(feeding.clone(), ControlSink::node(node.clone()))
                    .connect_control_flow(ControlSource::flow(node.clone(), flow.clone()), target.clone())
                    .connect_data_flow(SymbolSource::output(node, flow.clone(), slot), sink.clone());
                successors.push(successor);
            }
        }
    }
    successors
}
